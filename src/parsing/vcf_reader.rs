
use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Wrapper function that handles both gzip compressed and uncompressed call files.
/// The handle is dropped (and the descriptor released) when the returned reader goes out of scope.
/// # Arguments
/// * `filename` - path to the .vcf(.gz) file to open
pub fn open_call_file(filename: &Path) -> anyhow::Result<BufReader<Box<dyn std::io::Read>>> {
    let is_compressed = match filename.extension() {
        Some(extension) => {
            extension == "gz"
        },
        None => false
    };

    let raw_reader: Box<dyn std::io::Read> = if is_compressed {
        let file = File::open(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;
        Box::new(flate2::read::MultiGzDecoder::new(file))
    } else {
        let file = File::open(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;
        Box::new(file)
    };

    Ok(BufReader::new(raw_reader))
}

/// Splits one body line into its fixed tab-delimited columns, requiring at least `min_columns`.
/// # Arguments
/// * `line` - the raw data line
/// * `min_columns` - minimum number of columns for this file shape
pub fn split_columns(line: &str, min_columns: usize) -> anyhow::Result<Vec<&str>> {
    let columns: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if columns.len() < min_columns {
        anyhow::bail!("expected at least {} tab-delimited columns, found {}", min_columns, columns.len());
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;

    #[test]
    fn test_open_call_file_gzip() {
        // the plain and gzipped fixtures carry identical content
        let plain: Vec<String> = open_call_file(Path::new("test_data/sample1-query.vcf")).unwrap()
            .lines().collect::<Result<_, _>>().unwrap();
        let gzipped: Vec<String> = open_call_file(Path::new("test_data/sample1-query.vcf.gz")).unwrap()
            .lines().collect::<Result<_, _>>().unwrap();
        assert_eq!(plain, gzipped);
        assert!(plain[0].starts_with("##fileformat"));
    }

    #[test]
    fn test_split_columns() {
        let line = "1\t100\t.\tA\tC\t50\tPASS\tDP=3\tGT:DP\t0/1:3\n";
        let columns = split_columns(line, 10).unwrap();
        assert_eq!(columns.len(), 10);
        assert_eq!(columns[0], "1");
        assert_eq!(columns[9], "0/1:3");

        // short lines are an error
        assert!(split_columns("1\t100\t.\tA", 10).is_err());
    }
}

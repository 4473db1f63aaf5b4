/*!
# Writers module
Contains the logic for writing the output report.
*/

/// Plot handles and the HTML report assembler
pub mod report;

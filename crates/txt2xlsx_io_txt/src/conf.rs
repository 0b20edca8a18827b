//! Literal tables used while tokenizing and inferring column dtypes.

/// Tokens read as missing values by default.
pub const TUP_NA_VALUES_DEFAULT: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Tokens read as boolean `true`.
pub const TUP_BOOL_TRUE: [&str; 3] = ["True", "TRUE", "true"];
/// Tokens read as boolean `false`.
pub const TUP_BOOL_FALSE: [&str; 3] = ["False", "FALSE", "false"];

/// Separator placed between a duplicated header name and its counter (`A.1`).
pub const C_DUPLICATE_NAME_SEP: &str = ".";

/// Characters that separate fields; runs of them count as one separator.
pub const TUP_FIELD_SEPARATORS: [char; 2] = [' ', '\t'];
/// Quote character; a quoted run is one field and `""` inside it is a literal quote.
pub const C_QUOTE_CHAR: char = '"';

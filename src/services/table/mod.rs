use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use crate::core::errors::{Error, Result};
use crate::models::table::{SortMode, Table};

/// Candidate delimiters probed during detection, in priority order.
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Defines a sort over one delimited table file.
#[derive(Debug, Clone)]
pub struct SortRequest {
    pub input: PathBuf,
    pub column: String,
    /// Alternate destination; `None` rewrites the input in place.
    pub output: Option<PathBuf>,
    /// Forced delimiter; `None` detects one from the first line.
    pub delimiter: Option<u8>,
}

/// Describes how a completed sort was carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub delimiter: u8,
    /// True when the delimiter came from detection rather than the request.
    pub delimiter_detected: bool,
    pub mode: SortMode,
    pub rows: usize,
    pub destination: PathBuf,
    pub in_place: bool,
}

/// Sorts the rows of a delimited table ascending by one named column.
///
/// The key interpretation is table-wide: numeric when every value in the
/// column parses as a float, otherwise plain string comparison for all
/// rows. Ties keep their input order. Without an explicit output path the
/// input is replaced atomically via a temporary sibling, so the original
/// path never exposes a half-written table.
pub fn sort_by_column(request: &SortRequest) -> Result<SortOutcome> {
    if !request.input.exists() {
        return Err(Error::MissingFile(request.input.clone()));
    }

    let (delimiter, delimiter_detected) = match request.delimiter {
        Some(delimiter) => (delimiter, false),
        None => (detect_delimiter(&request.input)?, true),
    };
    if delimiter_detected {
        tracing::debug!(
            "detected delimiter {:?} in {}",
            delimiter as char,
            request.input.display()
        );
    }

    let mut table = load_table(&request.input, delimiter)?;
    let column = table
        .column_index(&request.column)
        .ok_or_else(|| Error::UnknownColumn {
            column: request.column.clone(),
            available: table.header.clone(),
        })?;

    let mode = sort_rows(&mut table.rows, column);
    tracing::debug!("sorted {} rows in {:?} mode", table.rows.len(), mode);

    let (destination, in_place) = match &request.output {
        Some(path) => (path.clone(), false),
        None => (request.input.clone(), true),
    };

    if in_place {
        let tmp = tmp_sibling(&request.input);
        if let Err(err) = write_table(&tmp, &table, delimiter) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        fs::rename(&tmp, &request.input)?;
    } else {
        write_table(&destination, &table, delimiter)?;
    }

    Ok(SortOutcome {
        delimiter,
        delimiter_detected,
        mode,
        rows: table.rows.len(),
        destination,
        in_place,
    })
}

/// Probes the first line of the file for each candidate delimiter in
/// priority order; comma when none is present. Best effort only, it does
/// not validate the rest of the file.
fn detect_delimiter(path: &Path) -> Result<u8> {
    let file = File::open(path)?;
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line)?;

    Ok(DELIMITER_CANDIDATES
        .into_iter()
        .find(|delimiter| first_line.as_bytes().contains(delimiter))
        .unwrap_or(b','))
}

fn load_table(path: &Path, delimiter: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new().delimiter(delimiter).from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(Table { header, rows })
}

/// Stable ascending sort of `rows` by the cell at `column`.
fn sort_rows(rows: &mut Vec<Vec<String>>, column: usize) -> SortMode {
    // One pass decides the interpretation for the whole table: any value
    // that does not parse as a float drops every row to string comparison.
    let keys: Option<Vec<f64>> = rows
        .iter()
        .map(|row| row[column].trim().parse::<f64>().ok())
        .collect();

    match keys {
        Some(keys) => {
            let mut keyed: Vec<(f64, Vec<String>)> = keys.into_iter().zip(rows.drain(..)).collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            rows.extend(keyed.into_iter().map(|(_, row)| row));
            SortMode::Numeric
        }
        None => {
            rows.sort_by(|a, b| a[column].cmp(&b[column]));
            SortMode::Lexicographic
        }
    }
}

fn write_table(path: &Path, table: &Table, delimiter: u8) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn request(input: &Path, column: &str) -> SortRequest {
        SortRequest {
            input: input.to_path_buf(),
            column: column.to_string(),
            output: None,
            delimiter: None,
        }
    }

    #[test]
    fn detects_delimiters_in_priority_order() -> Result<()> {
        let dir = TempDir::new().unwrap();

        let comma = write_input(&dir, "comma.csv", "a,b;c\n1,2\n");
        assert_eq!(detect_delimiter(&comma)?, b',');

        let semicolon = write_input(&dir, "semi.csv", "a;b|c\n1;2\n");
        assert_eq!(detect_delimiter(&semicolon)?, b';');

        let tab = write_input(&dir, "tab.tsv", "a\tb\n1\t2\n");
        assert_eq!(detect_delimiter(&tab)?, b'\t');

        let pipe = write_input(&dir, "pipe.csv", "a|b\n1|2\n");
        assert_eq!(detect_delimiter(&pipe)?, b'|');

        let none = write_input(&dir, "single.csv", "name\nBob\n");
        assert_eq!(detect_delimiter(&none)?, b',');

        Ok(())
    }

    #[test]
    fn numeric_keys_sort_numerically_and_keep_tie_order() {
        let mut rows = vec![
            vec!["Bob".to_string(), "30".to_string()],
            vec!["Ana".to_string(), "25".to_string()],
            vec!["Coe".to_string(), "25".to_string()],
        ];

        let mode = sort_rows(&mut rows, 1);

        assert_eq!(mode, SortMode::Numeric);
        let names: Vec<&str> = rows.iter().map(|row| row[0].as_str()).collect();
        assert_eq!(names, ["Ana", "Coe", "Bob"]);
    }

    #[test]
    fn one_non_numeric_value_drops_the_whole_table_to_text_order() {
        let mut rows = vec![
            vec!["x".to_string()],
            vec!["abc".to_string()],
            vec!["5".to_string()],
        ];

        let mode = sort_rows(&mut rows, 0);

        assert_eq!(mode, SortMode::Lexicographic);
        let values: Vec<&str> = rows.iter().map(|row| row[0].as_str()).collect();
        // Byte order: digits precede letters.
        assert_eq!(values, ["5", "abc", "x"]);
    }

    #[test]
    fn whitespace_padded_numbers_still_sort_numerically() {
        let mut rows = vec![
            vec![" 10 ".to_string()],
            vec!["2".to_string()],
        ];

        let mode = sort_rows(&mut rows, 0);

        assert_eq!(mode, SortMode::Numeric);
        assert_eq!(rows[0][0], "2");
    }

    #[test]
    fn missing_input_is_a_terminal_error() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("absent.csv");

        let result = sort_by_column(&request(&absent, "age"));
        assert!(matches!(result, Err(Error::MissingFile(_))));
    }

    #[test]
    fn unknown_column_lists_the_available_names() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "people.csv", "name,age\nBob,30\n");

        let result = sort_by_column(&request(&input, "height"));
        match result {
            Err(Error::UnknownColumn { column, available }) => {
                assert_eq!(column, "height");
                assert_eq!(available, ["name", "age"]);
            }
            other => panic!("expected UnknownColumn, got {other:?}"),
        }

        // The failed request must not have touched the file.
        assert_eq!(fs::read_to_string(&input).unwrap(), "name,age\nBob,30\n");
        Ok(())
    }

    #[test]
    fn forced_delimiter_bypasses_detection() -> Result<()> {
        let dir = TempDir::new().unwrap();
        // The header holds a comma, so detection would resolve ',' and the
        // "name" column would not exist under that split.
        let input = write_input(
            &dir,
            "forced.tsv",
            "name\tfavorite,color\nBob\tred,blue\nAna\tgreen\n",
        );

        let outcome = sort_by_column(&SortRequest {
            input: input.clone(),
            column: "name".to_string(),
            output: None,
            delimiter: Some(b'\t'),
        })?;

        assert!(!outcome.delimiter_detected);
        assert_eq!(outcome.delimiter, b'\t');
        assert_eq!(
            fs::read_to_string(&input).unwrap(),
            "name\tfavorite,color\nAna\tgreen\nBob\tred,blue\n"
        );
        Ok(())
    }
}

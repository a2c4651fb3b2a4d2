//! TSV loader for the sample tables.

use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::category::{Category, DIR_TYPE};
use crate::table::{Cell, Table};

/// Field values read as missing.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Loads a TSV table from `path` and tags every row with `category`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not a well-formed
/// tab-separated table with a header row.
pub fn load_table(path: &Path, category: Category) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut table = read_table(file).with_context(|| format!("parsing {}", path.display()))?;
    table.fill_column(DIR_TYPE, Cell::Text(category.label().to_string()));

    debug!(
        path = %path.display(),
        category = category.label(),
        rows = table.len(),
        columns = table.columns().len(),
        "Loaded table"
    );
    Ok(table)
}

/// Reads a tab-separated table with a header row, inferring one type per
/// column.
///
/// Short rows are padded with nulls; a row with more fields than the header
/// is an error. Repeated header names get a `.1`, `.2`, ... suffix.
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = dedup_headers(rdr.headers()?.iter());

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            bail!(
                "line {line}: found {} fields, but the header has {}",
                record.len(),
                headers.len()
            );
        }

        let mut fields = record.iter();
        for column in raw.iter_mut() {
            column.push(match fields.next() {
                Some(field) if !NA_VALUES.contains(&field) => Some(field.to_string()),
                _ => None,
            });
        }
    }

    let columns: Vec<Vec<Cell>> = raw.into_iter().map(infer_column).collect();
    let row_count = columns.first().map_or(0, Vec::len);

    let mut table = Table::new(headers);
    let mut columns: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
    for _ in 0..row_count {
        let row = columns
            .iter_mut()
            .map(|c| c.next().unwrap_or(Cell::Null))
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

fn dedup_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for name in names {
        let mut unique = name.to_string();
        let mut suffix = 1;
        while headers.contains(&unique) {
            unique = format!("{name}.{suffix}");
            suffix += 1;
        }
        headers.push(unique);
    }
    headers
}

/// Types a whole column: integers if every value is an integer, floats if
/// every value is a number, text otherwise. Surrounding spaces are ignored
/// when parsing numbers.
fn infer_column(values: Vec<Option<String>>) -> Vec<Cell> {
    if all_parse::<i64>(&values) {
        values
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse().ok()).map_or(Cell::Null, Cell::Int))
            .collect()
    } else if all_parse::<f64>(&values) {
        values
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse().ok()).map_or(Cell::Null, Cell::Float))
            .collect()
    } else {
        values
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Text))
            .collect()
    }
}

fn all_parse<T: FromStr>(values: &[Option<String>]) -> bool {
    values.iter().flatten().all(|v| v.trim().parse::<T>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "project_name\tpublication_year\tlatitude\tlongitude\tsample_age\tmaterial\n\
                          Warinner2014\t2014\t51.5\t-1.25\t950\tdental calculus\n\
                          Mann2018\t2018\t47.2\t8.5\tNA\tdental calculus\n";

    #[test]
    fn test_read_table_infers_column_types() {
        let table = read_table(SAMPLE.as_bytes()).unwrap();

        assert_eq!(
            table.columns(),
            [
                "project_name",
                "publication_year",
                "latitude",
                "longitude",
                "sample_age",
                "material"
            ]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][0], Cell::Text("Warinner2014".to_string()));
        assert_eq!(table.rows()[0][1], Cell::Int(2014));
        assert_eq!(table.rows()[0][2], Cell::Float(51.5));
        assert_eq!(table.rows()[0][3], Cell::Float(-1.25));
        assert_eq!(table.rows()[0][4], Cell::Int(950));
        assert_eq!(table.rows()[1][4], Cell::Null);
    }

    #[test]
    fn test_read_table_integer_latitude_column() {
        let table = read_table("latitude\tlongitude\n45\t7\n".as_bytes()).unwrap();
        assert_eq!(table.rows()[0][0], Cell::Int(45));
    }

    #[test]
    fn test_read_table_mixed_column_is_text() {
        let table = read_table("accession\n123\nERS42\n".as_bytes()).unwrap();
        assert_eq!(table.rows()[0][0], Cell::Text("123".to_string()));
        assert_eq!(table.rows()[1][0], Cell::Text("ERS42".to_string()));
    }

    #[test]
    fn test_read_table_header_only() {
        let table = read_table("latitude\tlongitude\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn test_read_table_long_row_is_an_error() {
        let result = read_table("a\tb\n1\t2\t3\n".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_read_table_short_row_padded_with_nulls() {
        let table = read_table("a\tlatitude\tlongitude\tnote\nx\t1.0\t2.0\ny\t3.0\t4.0\tok\n".as_bytes())
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][2], Cell::Float(2.0));
        assert_eq!(table.rows()[0][3], Cell::Null);
        assert_eq!(table.rows()[1][3], Cell::Text("ok".to_string()));
    }

    #[test]
    fn test_read_table_padded_numbers_stay_numeric() {
        let table = read_table("latitude\tlongitude\n45.1 \t7.0\n46.0\t 8\n".as_bytes()).unwrap();

        assert_eq!(table.rows()[0][0], Cell::Float(45.1));
        assert_eq!(table.rows()[1][0], Cell::Float(46.0));
        assert_eq!(table.rows()[1][1], Cell::Float(8.0));
    }

    #[test]
    fn test_read_table_renames_repeated_headers() {
        let table = read_table("site\tnote\tnote\tnote.1\nA\tx\ty\tz\n".as_bytes()).unwrap();

        assert_eq!(table.columns(), ["site", "note", "note.1", "note.1.1"]);
        assert_eq!(table.rows()[0][1], Cell::Text("x".to_string()));
        assert_eq!(table.rows()[0][2], Cell::Text("y".to_string()));
        assert_eq!(table.rows()[0][3], Cell::Text("z".to_string()));
    }

    #[test]
    fn test_load_table_tags_category() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let table = load_table(file.path(), Category::MetagenomeHostAssociated).unwrap();

        let i = table.column_index(DIR_TYPE).unwrap();
        assert_eq!(i, table.columns().len() - 1);
        for row in table.rows() {
            assert_eq!(
                row[i],
                Cell::Text("Ancient Metagenome - Host-associated".to_string())
            );
        }
    }

    #[test]
    fn test_load_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(
            &dir.path().join("absent.tsv"),
            Category::MetagenomeAnthropogenic,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("absent.tsv"));
    }
}

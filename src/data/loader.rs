//! CSV file handling for the matrix and attribute tables

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::data::matrix::WeightMatrix;
use crate::data::person::{flag_from_code, Birthplace, Person, Rank};
use crate::error::{AnalysisError, Result};

/// Number of columns in the attribute table
pub const ATTRIBUTE_COLUMNS: usize = 9;

/// Load the tie-weight matrix.
///
/// The first line is a header. When its first field is empty the first column
/// holds row labels and is skipped.
pub fn load_weight_matrix(path: impl AsRef<Path>, expected: Option<usize>) -> Result<WeightMatrix> {
    let path = path.as_ref();
    log::info!("Reading weight matrix: {}", path.display());
    ensure_exists(path)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;

    let labelled = reader
        .headers()?
        .get(0)
        .map_or(false, |first| first.is_empty());
    let skip = usize::from(labelled);
    log::debug!("Matrix row labels present: {}", labelled);

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let values = record
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(column, field)| parse_number(field, row, column))
            .collect::<Result<Vec<f64>>>()?;
        rows.push(values);
    }

    let matrix = WeightMatrix::from_rows(rows, expected)?;
    log::info!(
        "Loaded {}x{} weight matrix with {} ties",
        matrix.size(),
        matrix.size(),
        matrix.tie_count()
    );
    Ok(matrix)
}

/// Load the person attribute table.
///
/// Columns, in order: identifier, age, birthplace, residence, arrests,
/// convictions, prison, music, ranking. Row `k` must carry identifier `k + 1`.
pub fn load_persons(path: impl AsRef<Path>, expected: usize) -> Result<Vec<Person>> {
    let path = path.as_ref();
    log::info!("Reading attribute table: {}", path.display());
    ensure_exists(path)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?;
    log::debug!("Attribute header: {:?}", reader.headers()?);

    let mut persons = Vec::with_capacity(expected);
    for (row, record) in reader.records().enumerate() {
        persons.push(parse_person(&record?, row)?);
    }

    if persons.len() != expected {
        return Err(AnalysisError::RowCountMismatch {
            expected,
            found: persons.len(),
        });
    }

    log::info!("Loaded {} person records", persons.len());
    Ok(persons)
}

fn parse_person(record: &StringRecord, row: usize) -> Result<Person> {
    if record.len() != ATTRIBUTE_COLUMNS {
        return Err(AnalysisError::ColumnCount {
            row,
            expected: ATTRIBUTE_COLUMNS,
            found: record.len(),
        });
    }
    let field = |column: usize| parse_integer(&record[column], row, column);

    let expected_id = row as u32 + 1;
    let id = non_negative(field(0)?, row, "identifier")?;
    if id != expected_id {
        return Err(AnalysisError::IdentifierMismatch {
            row,
            expected: expected_id,
            found: id,
        });
    }

    Ok(Person {
        id,
        age: non_negative(field(1)?, row, "age")?,
        birthplace: Birthplace::from_code(field(2)?, row)?,
        resident: flag_from_code(field(3)?, row, "residence")?,
        arrests: non_negative(field(4)?, row, "arrests")?,
        convictions: non_negative(field(5)?, row, "convictions")?,
        prison: flag_from_code(field(6)?, row, "prison")?,
        music: flag_from_code(field(7)?, row, "music")?,
        rank: Rank::from_code(field(8)?, row)?,
    })
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(AnalysisError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ))
    }
}

fn parse_number(field: &str, row: usize, column: usize) -> Result<f64> {
    field.parse::<f64>().map_err(|_| AnalysisError::Parse {
        row,
        column,
        value: field.to_string(),
        expected: "number",
    })
}

/// Integers may be written as `3` or `3.0`
fn parse_integer(field: &str, row: usize, column: usize) -> Result<i64> {
    let value = parse_number(field, row, column)?;
    if value.is_finite() && value.fract() == 0.0 {
        Ok(value as i64)
    } else {
        Err(AnalysisError::Parse {
            row,
            column,
            value: field.to_string(),
            expected: "integer",
        })
    }
}

fn non_negative(value: i64, row: usize, field: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| AnalysisError::InvalidCode { row, field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_labelled_matrix() {
        let file = write_file("\"\",X1,X2,X3\n1,0,2,0\n2,2,0,1\n3,0,1,0\n");
        let matrix = load_weight_matrix(file.path(), Some(3)).unwrap();
        assert_eq!(matrix.weight(0, 1), 2);
        assert_eq!(matrix.weight(2, 1), 1);
    }

    #[test]
    fn reads_unlabelled_matrix() {
        let file = write_file("X1,X2\n0,4\n4,0\n");
        let matrix = load_weight_matrix(file.path(), None).unwrap();
        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.weight(0, 1), 4);
    }

    #[test]
    fn non_numeric_cell_reports_position() {
        let file = write_file("X1,X2\n0,x\n1,0\n");
        let err = load_weight_matrix(file.path(), None).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { row: 0, column: 1, .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_weight_matrix("/definitely/not/here.csv", None).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn reads_person_rows() {
        let file = write_file(
            "\"\",Age,Birthplace,Residence,Arrests,Convictions,Prison,Music,Ranking\n\
             1,20,1,0,16,4,1,1,1\n\
             2,28.0,2,1,15,2,0,0,5\n",
        );
        let persons = load_persons(file.path(), 2).unwrap();
        assert_eq!(persons[0].birthplace, Birthplace::WestAfrica);
        assert!(persons[0].prison);
        assert_eq!(persons[1].age, 28);
        assert_eq!(persons[1].rank.level(), 5);
    }

    #[test]
    fn person_identifiers_follow_matrix_order() {
        let file = write_file("id,a,b,c,d,e,f,g,h\n2,20,1,0,1,1,0,0,1\n");
        let err = load_persons(file.path(), 1).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::IdentifierMismatch { row: 0, expected: 1, found: 2 }
        ));
    }

    #[test]
    fn person_count_must_match_matrix() {
        let file = write_file("id,a,b,c,d,e,f,g,h\n1,20,1,0,1,1,0,0,1\n");
        let err = load_persons(file.path(), 54).unwrap_err();
        assert!(matches!(err, AnalysisError::RowCountMismatch { expected: 54, found: 1 }));
    }

    #[test]
    fn bad_categorical_code_is_rejected() {
        let file = write_file("id,a,b,c,d,e,f,g,h\n1,20,9,0,1,1,0,0,1\n");
        let err = load_persons(file.path(), 1).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidCode { field: "birthplace", .. }));
    }
}

use std::path::Path;

use crate::error::{IccError, Result};
use crate::types::DenseMatrix;

use super::factor::LevelIndex;
use super::ratings::RatingMatrix;

fn reader_for(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Headers that usually mark a subject identifier rather than a rater.
fn looks_like_id(header: &str) -> bool {
    let h = header.trim().to_ascii_lowercase();
    matches!(
        h.as_str(),
        "" | "#" | "id" | "subject" | "subj" | "case" | "patient" | "participant" | "item" | "target"
    ) || h.ends_with("_id")
        || h.ends_with(" id")
}

impl RatingMatrix {
    /// Read a wide CSV file: one row per subject, one column per rater.
    ///
    /// The header row names the raters. If the first column is not entirely
    /// numeric it is taken as the subject labels and its header is ignored.
    /// A numeric ID column is indistinguishable from a rater; use
    /// [`RatingMatrix::from_csv_with_subject_column`] for such files.
    /// Every remaining cell must parse as `f64`; missing values are not
    /// supported.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, a rater column holds a
    /// non-numeric value, or the table is smaller than 2 x 2.
    ///
    /// # Examples
    /// ```no_run
    /// use icc_core::data::RatingMatrix;
    ///
    /// let m = RatingMatrix::from_csv("ratings.csv").unwrap();
    /// println!("{} subjects x {} raters", m.n_subjects(), m.n_raters());
    /// ```
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_wide(path.as_ref(), None)
    }

    /// Read a wide CSV file whose subject labels sit in the named column.
    ///
    /// The column may hold numbers (`1, 2, 3, ...`) and may appear at any
    /// position; every other column is a rater.
    ///
    /// # Errors
    /// As [`RatingMatrix::from_csv`], plus [`IccError::Data`] when
    /// `subject_col` is not in the header.
    pub fn from_csv_with_subject_column<P: AsRef<Path>>(path: P, subject_col: &str) -> Result<Self> {
        read_wide(path.as_ref(), Some(subject_col))
    }

    /// Read a long ("tidy") CSV file with one measurement per row.
    ///
    /// `subject_col`, `rater_col` and `score_col` name the columns holding the
    /// subject label, the rater label and the measurement. Subjects and raters
    /// become rows and columns in order of first appearance. The design must
    /// be complete: exactly one measurement for every subject x rater pair.
    ///
    /// # Errors
    /// Returns [`IccError::Data`] for a missing column, a non-numeric score,
    /// a duplicated subject x rater pair or a missing one.
    pub fn from_long_csv<P: AsRef<Path>>(
        path: P,
        subject_col: &str,
        rater_col: &str,
        score_col: &str,
    ) -> Result<Self> {
        let mut reader = reader_for(path.as_ref())?;
        let headers = reader.headers()?.clone();

        let locate = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| IccError::Data(format!("Column '{}' not found in CSV header", name)))
        };
        let s_idx = locate(subject_col)?;
        let r_idx = locate(rater_col)?;
        let y_idx = locate(score_col)?;

        let mut subjects = Vec::new();
        let mut raters = Vec::new();
        let mut scores = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let score = record[y_idx].parse::<f64>().map_err(|_| {
                IccError::Data(format!(
                    "Score column '{}' has non-numeric value '{}' in data row {}",
                    score_col,
                    &record[y_idx],
                    row + 1
                ))
            })?;
            subjects.push(record[s_idx].to_string());
            raters.push(record[r_idx].to_string());
            scores.push(score);
        }

        let subject_index = LevelIndex::new(&subjects);
        let rater_index = LevelIndex::new(&raters);
        let n = subject_index.n_levels();
        let k = rater_index.n_levels();
        if n < 2 {
            return Err(IccError::TooFewSubjects(n));
        }
        if k < 2 {
            return Err(IccError::TooFewRaters(k));
        }

        let mut cells: Vec<Option<f64>> = vec![None; n * k];
        for ((&i, &j), &score) in subject_index
            .codes()
            .iter()
            .zip(rater_index.codes())
            .zip(&scores)
        {
            let cell = &mut cells[i * k + j];
            if cell.is_some() {
                return Err(IccError::Data(format!(
                    "Duplicate measurement for subject '{}' by rater '{}'",
                    subject_index.level_name(i).unwrap_or_default(),
                    rater_index.level_name(j).unwrap_or_default()
                )));
            }
            *cell = Some(score);
        }

        let mut data = Vec::with_capacity(n * k);
        for i in 0..n {
            for j in 0..k {
                match cells[i * k + j] {
                    Some(v) => data.push(v),
                    None => {
                        return Err(IccError::Data(format!(
                            "Missing measurement for subject '{}' by rater '{}'",
                            subject_index.level_name(i).unwrap_or_default(),
                            rater_index.level_name(j).unwrap_or_default()
                        )))
                    }
                }
            }
        }

        RatingMatrix::from_matrix(DenseMatrix::from_row_slice(n, k, &data))?
            .with_subject_labels(subject_index.labels())?
            .with_rater_labels(rater_index.labels())
    }
}

fn read_wide(path: &Path, subject_col: Option<&str>) -> Result<RatingMatrix> {
    let mut reader = reader_for(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let ncols = headers.len();

    let mut string_columns: Vec<Vec<String>> = vec![Vec::new(); ncols];
    for result in reader.records() {
        let record = result?;
        for (i, field) in record.iter().enumerate() {
            string_columns[i].push(field.to_string());
        }
    }

    let nrows = string_columns.first().map_or(0, |c| c.len());
    if nrows == 0 {
        return Err(IccError::TooFewSubjects(0));
    }

    let label_idx = match subject_col {
        Some(name) => Some(headers.iter().position(|h| h == name).ok_or_else(|| {
            IccError::Data(format!("Column '{}' not found in CSV header", name))
        })?),
        None => {
            // A leading column that does not parse as numbers holds subject labels.
            let has_labels = string_columns[0].iter().any(|s| s.parse::<f64>().is_err());
            if !has_labels && looks_like_id(&headers[0]) {
                log::warn!(
                    "First column '{}' is numeric and read as a rater; \
                     name it as the subject column if it holds subject IDs",
                    headers[0]
                );
            }
            has_labels.then_some(0)
        }
    };

    let rater_idx: Vec<usize> = (0..ncols).filter(|&c| Some(c) != label_idx).collect();
    let mut rater_columns = Vec::with_capacity(rater_idx.len());
    for &col_idx in &rater_idx {
        let values = string_columns[col_idx]
            .iter()
            .enumerate()
            .map(|(row, s)| {
                s.parse::<f64>().map_err(|_| {
                    IccError::Data(format!(
                        "Rater column '{}' has non-numeric value '{}' in data row {}",
                        headers[col_idx],
                        s,
                        row + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rater_columns.push(values);
    }

    let k = rater_columns.len();
    let values = DenseMatrix::from_fn(nrows, k, |i, j| rater_columns[j][i]);
    let rater_labels = rater_idx.iter().map(|&c| headers[c].clone()).collect();
    let mut matrix = RatingMatrix::from_matrix(values)?.with_rater_labels(rater_labels)?;
    if let Some(idx) = label_idx {
        matrix = matrix.with_subject_labels(string_columns.swap_remove(idx))?;
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Helper: write CSV content to a temporary file and return the path.
    fn write_temp_csv(content: &str) -> String {
        let dir = std::env::temp_dir();
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let file_name = format!("test_icc_{}_{}.csv", std::process::id(), id);
        let path = dir.join(file_name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_wide_numeric_only() {
        let path = write_temp_csv("judge1,judge2\n9,2\n6,1\n8,4\n");
        let m = RatingMatrix::from_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(m.n_subjects(), 3);
        assert_eq!(m.n_raters(), 2);
        assert_eq!(m.rater_labels(), &["judge1", "judge2"]);
        assert_eq!(m.subject_labels()[0], "S1");
        assert_eq!(m.subject(1), vec![6.0, 1.0]);
    }

    #[test]
    fn test_wide_with_subject_labels() {
        let path = write_temp_csv("patient, nurse , doctor\np1, 9, 2\np2, 6, 1\np3, 8, 4\n");
        let m = RatingMatrix::from_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(m.n_raters(), 2);
        assert_eq!(m.subject_labels(), &["p1", "p2", "p3"]);
        assert_eq!(m.rater_labels(), &["nurse", "doctor"]);
        assert_eq!(m.subject(2), vec![8.0, 4.0]);
    }

    #[test]
    fn test_wide_numeric_ids_need_subject_column() {
        let csv = "id,nurse,doctor\n1,9,2\n2,6,1\n3,8,4\n4,7,1\n5,10,5\n";
        let path = write_temp_csv(csv);

        // Without a hint the numeric IDs look like a third rater.
        let guessed = RatingMatrix::from_csv(&path).unwrap();
        assert_eq!(guessed.n_raters(), 3);

        let m = RatingMatrix::from_csv_with_subject_column(&path, "id").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(m.n_subjects(), 5);
        assert_eq!(m.n_raters(), 2);
        assert_eq!(m.subject_labels(), &["1", "2", "3", "4", "5"]);
        assert_eq!(m.rater_labels(), &["nurse", "doctor"]);
        assert_eq!(m.subject(4), vec![10.0, 5.0]);
    }

    #[test]
    fn test_wide_subject_column_in_any_position() {
        let path = write_temp_csv("nurse,case,doctor\n9,a,2\n6,b,1\n8,c,4\n");
        let m = RatingMatrix::from_csv_with_subject_column(&path, "case").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(m.subject_labels(), &["a", "b", "c"]);
        assert_eq!(m.rater_labels(), &["nurse", "doctor"]);
        assert_eq!(m.subject(1), vec![6.0, 1.0]);
    }

    #[test]
    fn test_wide_unknown_subject_column() {
        let path = write_temp_csv("a,b\n1,2\n3,4\n");
        let err = RatingMatrix::from_csv_with_subject_column(&path, "id").unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, IccError::Data(_)));
        assert!(err.to_string().contains("'id'"));
    }

    #[test]
    fn test_id_like_headers() {
        for h in ["id", "ID", "Subject", "patient_id", "case id", ""] {
            assert!(looks_like_id(h), "{:?}", h);
        }
        for h in ["nurse", "rater1", "judge", "width"] {
            assert!(!looks_like_id(h), "{:?}", h);
        }
    }

    #[test]
    fn test_wide_missing_value_rejected() {
        let path = write_temp_csv("id,a,b\ns1,1,NA\ns2,2,3\n");
        let err = RatingMatrix::from_csv(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, IccError::Data(_)));
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_wide_header_only() {
        let path = write_temp_csv("a,b\n");
        let err = RatingMatrix::from_csv(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, IccError::TooFewSubjects(0)));
    }

    #[test]
    fn test_wide_single_rater_rejected() {
        let path = write_temp_csv("id,a\ns1,1\ns2,2\n");
        let err = RatingMatrix::from_csv(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, IccError::TooFewRaters(1)));
    }

    #[test]
    fn test_file_not_found() {
        let err = RatingMatrix::from_csv("/nonexistent/path/ratings.csv").unwrap_err();
        assert!(matches!(err, IccError::Csv(_)));
    }

    #[test]
    fn test_long_format() {
        let csv = "subject,rater,score\n\
                   a,r1,9\na,r2,2\nb,r2,1\nb,r1,6\nc,r1,8\nc,r2,4\n";
        let path = write_temp_csv(csv);
        let m = RatingMatrix::from_long_csv(&path, "subject", "rater", "score").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(m.n_subjects(), 3);
        assert_eq!(m.n_raters(), 2);
        assert_eq!(m.subject_labels(), &["a", "b", "c"]);
        assert_eq!(m.rater_labels(), &["r1", "r2"]);
        assert_eq!(m.subject(1), vec![6.0, 1.0]);
    }

    #[test]
    fn test_long_incomplete_design() {
        let csv = "subject,rater,score\na,r1,9\na,r2,2\nb,r1,6\n";
        let path = write_temp_csv(csv);
        let err = RatingMatrix::from_long_csv(&path, "subject", "rater", "score").unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("Missing measurement for subject 'b' by rater 'r2'"));
    }

    #[test]
    fn test_long_duplicate_cell() {
        let csv = "subject,rater,score\na,r1,9\na,r1,8\na,r2,2\nb,r1,6\nb,r2,1\n";
        let path = write_temp_csv(csv);
        let err = RatingMatrix::from_long_csv(&path, "subject", "rater", "score").unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("Duplicate measurement"));
    }

    #[test]
    fn test_long_missing_column() {
        let path = write_temp_csv("subject,rater,value\na,r1,1\n");
        let err = RatingMatrix::from_long_csv(&path, "subject", "rater", "score").unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, IccError::Data(_)));
    }
}

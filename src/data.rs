use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::ColumnsError;

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

/// One column of the loaded file, every value already rendered as a string.
#[derive(Debug, Clone)]
pub struct DataColumn {
    pub name: String,
    pub max_width: usize,
    pub data: Vec<String>,
}

impl DataColumn {
    pub fn new(name: impl Into<String>, data: Vec<String>) -> Self {
        let max_width = data.iter().map(|s| s.chars().count()).max().unwrap_or(0);
        Self {
            name: name.into(),
            max_width,
            data,
        }
    }

    pub fn as_string(&self) -> String {
        format!(
            "\"{}\", width_max: {}, # rows {}",
            self.name,
            self.max_width,
            self.data.len(),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub name: String,
    pub columns: Vec<DataColumn>,
}

impl DataSet {
    pub fn new(name: impl Into<String>, columns: Vec<DataColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ColumnsError> {
        let path = check_file(path)?;
        let frame = match detect_file_type(&path)? {
            FileType::CSV => load_csv(&path)?,
            FileType::PARQUET => load_parquet(&path)?,
            FileType::ARROW => load_arrow(&path)?,
        };

        // Each column is converted to strings in its own rayon task.
        let start_time = Instant::now();
        let df = Arc::new(frame.collect()?);
        let c_: Result<Vec<DataColumn>, _> = df
            .get_column_names()
            .par_iter()
            .map(|name| load_column(&df, name))
            .collect();
        let columns = c_?;
        info!("Loading data took {}ms ...", start_time.elapsed().as_millis());
        for c in columns.iter() {
            debug!("Column: {}", c.as_string());
        }

        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        Ok(Self { name, columns })
    }

    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }
}

fn check_file(path: &Path) -> Result<PathBuf, ColumnsError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ColumnsError::FileNotFound,
        ErrorKind::PermissionDenied => ColumnsError::PermissionDenied,
        _ => ColumnsError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(ColumnsError::LoadingFailed("Not a file!".into()));
    }
    Ok(path.to_path_buf())
}

fn detect_file_type(path: &Path) -> Result<FileType, ColumnsError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(ColumnsError::UnknownFileType),
    }
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<DataColumn, PolarsError> {
    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let data = series
        .into_iter()
        .map(|value| match value {
            Some(s) => s.replace("\r\n", " ↵ ").replace('\n', " ↵ "),
            None => String::from("∅"),
        })
        .collect();
    Ok(DataColumn::new(col_name, data))
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_file_types() {
        assert_eq!(detect_file_type(Path::new("a.csv")).unwrap(), FileType::CSV);
        assert_eq!(detect_file_type(Path::new("a.PQ")).unwrap(), FileType::PARQUET);
        assert_eq!(detect_file_type(Path::new("a.feather")).unwrap(), FileType::ARROW);
        assert!(matches!(
            detect_file_type(Path::new("a.xlsx")),
            Err(ColumnsError::UnknownFileType)
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            DataSet::load(Path::new("does/not/exist.csv")),
            Err(ColumnsError::FileNotFound)
        ));
    }

    #[test]
    fn loads_csv_as_strings() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let path = tmp_dir.path().join("samples.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "uniqueId,projectId,amount").unwrap();
        writeln!(file, "S-1,P-10,12").unwrap();
        writeln!(file, "S-2,,7").unwrap();
        drop(file);

        let data = DataSet::load(&path).unwrap();
        assert_eq!(data.name, "samples.csv");
        assert_eq!(data.header(), vec!["uniqueId", "projectId", "amount"]);
        assert_eq!(data.nrows(), 2);
        assert_eq!(data.column("projectId").unwrap().data, vec!["P-10", "∅"]);
        assert_eq!(data.column("amount").unwrap().data, vec!["12", "7"]);
    }
}

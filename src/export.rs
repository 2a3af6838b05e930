//! Turning images into CSV rows.

use log::info;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::columns::ColumnSelection;
use crate::docker::ImageLister;
use crate::errors::*;
use crate::image::{format_megabytes, Image};

/// Output file used when no columns were requested.
pub const DEFAULT_OUTPUT_FILE: &str = "docker_images.csv";

/// Every column of one output row, in canonical order.
pub type Row = [String; 9];

/// The file name for an export of `columns`: `docker_images.csv`, or
/// `docker_images_<columns>.csv` with commas turned into underscores.
pub fn output_file_name(columns: Option<&str>) -> PathBuf {
    match columns {
        Some(columns) if !columns.is_empty() => {
            PathBuf::from(format!("docker_images_{}.csv", columns.replace(',', "_")))
        }
        _ => PathBuf::from(DEFAULT_OUTPUT_FILE),
    }
}

/// Build the full rows for `image`: one per repo:tag, or a single row for
/// an untagged image. Only the repository and tag differ between them.
pub fn image_rows(image: &Image) -> Result<Vec<Row>> {
    let id = image.short_id()?;
    let created = image.Created.to_string();
    let size = format_megabytes(image.Size);
    let shared_size = format_megabytes(image.SharedSize);
    let virtual_size = format_megabytes(image.virtual_size());
    let containers = image.Containers.to_string();
    let labels = image
        .labels()
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("; ");

    let rows = image
        .repo_tag_pairs()
        .into_iter()
        .map(|(repo, tag)| {
            [
                id.to_owned(),
                repo.to_owned(),
                tag.to_owned(),
                created.clone(),
                size.clone(),
                shared_size.clone(),
                virtual_size.clone(),
                containers.clone(),
                labels.clone(),
            ]
        })
        .collect();
    Ok(rows)
}

/// Writes a header and then image rows, restricted to the selected columns.
pub struct CsvExporter<W: Write> {
    writer: csv::Writer<W>,
    selection: ColumnSelection,
    rows: usize,
}

impl<W: Write> CsvExporter<W> {
    /// Wrap `inner` and write the header row.
    pub fn new(inner: W, selection: ColumnSelection) -> Result<CsvExporter<W>> {
        let mut writer = csv::Writer::from_writer(inner);
        writer
            .write_record(selection.header())
            .chain_err(|| ErrorKind::WriteOutput("header"))?;
        Ok(CsvExporter {
            writer,
            selection,
            rows: 0,
        })
    }

    /// Write every row for `image`, returning how many were written.
    pub fn write_image(&mut self, image: &Image) -> Result<usize> {
        let rows = image_rows(image)?;
        for row in &rows {
            self.writer
                .write_record(self.selection.project(row))
                .chain_err(|| ErrorKind::WriteOutput("row"))?;
        }
        self.rows += rows.len();
        Ok(rows.len())
    }

    /// Flush everything to the underlying writer and return the number of
    /// data rows written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer
            .flush()
            .chain_err(|| ErrorKind::WriteOutput("CSV file"))?;
        Ok(self.rows)
    }
}

/// Write `images` to a new (or truncated) CSV file at `path`.
pub fn export_images(images: &[Image], selection: &ColumnSelection, path: &Path) -> Result<usize> {
    let file = File::create(path).chain_err(|| ErrorKind::CreateOutput(path.display().to_string()))?;
    let mut exporter = CsvExporter::new(file, selection.clone())?;
    for image in images {
        exporter.write_image(image)?;
    }
    let rows = exporter.finish()?;
    info!(
        "wrote {} rows for {} images to {}",
        rows,
        images.len(),
        path.display()
    );
    Ok(rows)
}

/// Fetch the image list from `lister` and export it, returning the number
/// of images exported.
pub async fn export_from<L: ImageLister>(
    lister: &L,
    selection: &ColumnSelection,
    path: &Path,
) -> Result<usize> {
    let images = lister.list_images().await?;
    export_images(&images, selection, path)?;
    Ok(images.len())
}

use crate::intern::InternTable;
use crate::models::ProductEntry;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

fn tmp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        ".{}.tmp-{}",
        file_name,
        chrono::Local::now().timestamp_millis()
    ))
}

/// Writes through a temp file in the same directory, then renames it over `path`,
/// so readers never observe a half-written file.
pub fn write_atomically<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> io::Result<()>,
{
    let tmp = tmp_path(path);
    let result = fs::File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush()
        })
        .and_then(|_| fs::rename(&tmp, path));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// One `{"id":..,"asin":..}` object per line, in id order.
pub fn write_products<W: Write>(mut out: W, products: &InternTable) -> io::Result<()> {
    for (id, asin) in products.iter() {
        serde_json::to_writer(&mut out, &ProductEntry { id, asin })?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

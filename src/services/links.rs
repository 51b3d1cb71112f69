//! Turns scraped direct links into a file name → URL map and persists it.

use crate::models::LinkMap;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::io;

/// Suffix of the output file written next to the uploaded images
pub const OUTPUT_SUFFIX: &str = "_imgbb.txt";

/// ImgBB asset-name markers and the local names they map back to.
/// Applied in order, after dashes have become dots.
const NAME_REWRITES: [(&str, &str); 3] = [
    (".preview.webp", "_preview.webp"),
    (".preview.sheet.webp", "_preview_sheet.webp"),
    (".thumbnails.jpg", "_thumbnails.jpg"),
];

/// Guess the local file name an ImgBB direct link was uploaded from.
///
/// ```
/// use imgbb_uploader::services::derive_file_name;
///
/// assert_eq!(
///     derive_file_name("https://i.ibb.co/im/abc-def.preview.webp"),
///     "abc.def_preview.webp"
/// );
/// ```
pub fn derive_file_name(url: &str) -> String {
    let base = url.rsplit('/').next().unwrap_or(url);
    let mut name = base.replace('-', ".");
    for (from, to) in NAME_REWRITES {
        name = name.replace(from, to);
    }
    name
}

/// Split the contents of the direct-links textarea into trimmed, non-empty lines.
pub fn split_links(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Key every link by its derived file name. A later link with the same
/// derived name replaces the earlier one.
pub fn build_link_map<S: AsRef<str>>(links: &[S]) -> LinkMap {
    let mut map = LinkMap::new();
    for link in links {
        let link = link.as_ref();
        let file_name = derive_file_name(link);
        if let Some(previous) = map.insert(file_name.clone(), link.to_string()) {
            tracing::debug!("{} overwrites {} for {}", link, previous, file_name);
        }
    }
    map
}

/// `<working_path>/<folder name>_imgbb.txt`
pub fn output_path(working_path: &Utf8Path) -> Utf8PathBuf {
    let folder_name = working_path.file_name().unwrap_or("");
    working_path.join(format!("{}{}", folder_name, OUTPUT_SUFFIX))
}

/// Delete a previous run's output so it can never be mixed with this run's.
///
/// Returns whether a file was removed.
pub fn remove_stale_output(path: &Utf8Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("Removed previous output {}", path);
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Render the map as JSON indented by four spaces.
pub fn render_link_map(map: &LinkMap) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    map.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write the map to `path`, replacing whatever was there.
pub fn write_link_map(path: &Utf8Path, map: &LinkMap) -> io::Result<()> {
    let json = render_link_map(map).map_err(io::Error::other)?;
    fs::write(path, json)?;
    tracing::info!("Direct links saved to: {}", path);
    Ok(())
}

use crate::sitemap::SITEMAP_NAMESPACE;
use quick_xml::escape::escape;
use std::path::{Path, PathBuf};
use url::Url;

/// Inserts a `_partN` suffix before the extension of `filename`
///
/// # Examples
///
/// ```
/// use ripple_sitemap::sitemap::part_filename;
///
/// assert_eq!(part_filename("sitemap.xml", 2), "sitemap_part2.xml");
/// assert_eq!(part_filename("sitemap", 1), "sitemap_part1");
/// ```
pub fn part_filename(filename: &str, part: usize) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());

    match path.extension() {
        Some(ext) => format!("{}_part{}.{}", stem, part, ext.to_string_lossy()),
        None => format!("{}_part{}", stem, part),
    }
}

/// Path of part `part` next to `destination`
pub fn part_path(destination: &Path, part: usize) -> PathBuf {
    let filename = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(part_filename(&filename, part))
}

/// Builds a sitemap index referencing `part_count` parts
///
/// Each `<loc>` joins the origin of `site_url` with the part filename derived
/// from `base_filename`, numbered from 1 in sealed order.
///
/// # Examples
///
/// ```
/// use ripple_sitemap::sitemap::build_sitemap_index;
/// use url::Url;
///
/// let site = Url::parse("https://example.com/blog/").unwrap();
/// let xml = build_sitemap_index(&site, "sitemap.xml", 2);
/// assert!(xml.contains("<loc>https://example.com/sitemap_part1.xml</loc>"));
/// assert!(xml.contains("<loc>https://example.com/sitemap_part2.xml</loc>"));
/// ```
pub fn build_sitemap_index(site_url: &Url, base_filename: &str, part_count: usize) -> String {
    let origin = site_url.origin().ascii_serialization();

    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sitemapindex xmlns=\"{}\">\n",
        SITEMAP_NAMESPACE
    );

    for part in 1..=part_count {
        let loc = format!("{}/{}", origin, part_filename(base_filename, part));
        xml.push_str(&format!(
            "  <sitemap>\n    <loc>{}</loc>\n  </sitemap>\n",
            escape(loc.as_str())
        ));
    }

    xml.push_str("</sitemapindex>\n");
    xml
}

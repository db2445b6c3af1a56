use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use flate2::Compression;
use image::ImageFormat;
use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::package::{CONTAINER_XML, content_opf, nav_points, toc_ncx};
use super::pages;
use crate::error::{Error, Result};
use crate::project::Project;

/// Configuration for EPUB writing.
#[derive(Debug, Clone, Default)]
pub struct EpubConfig {
    /// Compression level for deflate (0-9, defaults to zlib's level 6).
    pub compression_level: Option<u32>,
    /// Year on the copyright page. Defaults to the current UTC year.
    pub copyright_year: Option<i32>,
}

/// Writes a built [`Project`] as an EPUB 2 archive.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use bindery::{Config, EpubWriter, Pipeline, Project, minify::Minifier};
///
/// let config = Config::load("epub_info.json")?;
/// let project = Pipeline::new(&Minifier).run(Project::from_config(&config))?;
/// let epub = EpubWriter::new().write(&project, Path::new("."))?;
/// # Ok::<(), bindery::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EpubWriter {
    config: EpubConfig,
}

/// Archive being assembled, shared by the steps.
struct Package<'p, W: Write + Seek> {
    zip: ZipWriter<W>,
    stored: SimpleFileOptions,
    deflated: SimpleFileOptions,
    project: &'p Project,
    copyright_year: i32,
}

impl<W: Write + Seek> Package<'_, W> {
    fn add(&mut self, name: &str, content: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.deflated)?;
        self.zip.write_all(content)?;
        Ok(())
    }
}

type Step<W> = fn(&mut Package<'_, W>) -> Result<()>;

/// Archive steps in entry order. Each either adds entries or does nothing.
fn steps<W: Write + Seek>() -> [(&'static str, Step<W>); 12] {
    [
        ("mimetype", write_mimetype),
        ("container", write_container),
        ("styles", write_styles),
        ("cover_image", write_cover_image),
        ("cover_page", write_cover_page),
        ("title_page", write_title_page),
        ("copyright_page", write_copyright_page),
        ("contents_page", write_contents_page),
        ("text_page", write_text_page),
        ("assets", write_assets),
        ("opf", write_opf),
        ("ncx", write_ncx),
    ]
}

impl EpubWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }

    /// Write `<out_dir>/<output_title>.epub`.
    ///
    /// The archive is written as `.zip` first and only renamed to `.epub`
    /// once complete. On failure the partial `.zip` is removed.
    pub fn write(&self, project: &Project, out_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;

        let stem = if project.output_title.is_empty() {
            crate::util::snake_case(&project.metadata.title)
        } else {
            project.output_title.clone()
        };
        let zip_path = out_dir.join(format!("{stem}.zip"));
        let epub_path = out_dir.join(format!("{stem}.epub"));

        if let Err(e) = self.write_zip(project, &zip_path) {
            debug!("removing partial archive {}", zip_path.display());
            let _ = fs::remove_file(&zip_path);
            return Err(e);
        }

        fs::rename(&zip_path, &epub_path).map_err(|source| Error::Rename {
            from: zip_path.clone(),
            to: epub_path.clone(),
            source,
        })?;
        Ok(epub_path)
    }

    fn write_zip(&self, project: &Project, zip_path: &Path) -> Result<()> {
        let file = File::create(zip_path).map_err(|e| Error::io(zip_path, e))?;
        let mut writer = self.write_to_writer(project, BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }

    /// Write the archive to any [`Write`] + [`Seek`] destination and return it.
    pub fn write_to_writer<W: Write + Seek>(&self, project: &Project, writer: W) -> Result<W> {
        let compression_level = self
            .config
            .compression_level
            .unwrap_or_else(|| Compression::default().level());
        let copyright_year = self
            .config
            .copyright_year
            .unwrap_or_else(|| chrono::Utc::now().year());

        let mut package = Package {
            zip: ZipWriter::new(writer),
            stored: SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            deflated: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(compression_level as i64)),
            project,
            copyright_year,
        };

        for (name, step) in steps::<W>() {
            debug!("epub step {name}");
            step(&mut package)?;
        }

        Ok(package.zip.finish()?)
    }
}

fn write_mimetype<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    p.zip.start_file("mimetype", p.stored)?;
    p.zip.write_all(b"application/epub+zip")?;
    Ok(())
}

fn write_container<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    p.add("META-INF/container.xml", CONTAINER_XML.as_bytes())
}

fn write_styles<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    let project = p.project;
    p.add("styles.css", &project.styles)
}

fn write_cover_image<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    let project = p.project;
    let Some(cover) = &project.cover else {
        return Ok(());
    };

    let mut png = Vec::new();
    cover
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|source| Error::Image {
            path: PathBuf::from("cover.png"),
            source,
        })?;
    p.add("cover.png", &png)
}

fn write_cover_page<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    let project = p.project;
    let Some(cover) = &project.cover else {
        return Ok(());
    };
    let page = pages::cover_page(project, cover.width(), cover.height());
    p.add("cover.xhtml", page.as_bytes())
}

fn write_title_page<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    let page = pages::title_page(p.project);
    p.add("title.xhtml", page.as_bytes())
}

fn write_copyright_page<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    if !p.project.flags.include_copyright_page {
        return Ok(());
    }
    let page = pages::copyright_page(p.project, p.copyright_year);
    p.add("copyright.xhtml", page.as_bytes())
}

fn write_contents_page<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    if !p.project.flags.include_contents_page {
        return Ok(());
    }
    let page = pages::contents_page(p.project);
    p.add("contents.xhtml", page.as_bytes())
}

fn write_text_page<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    let page = pages::text_page(p.project);
    p.add("text.xhtml", page.as_bytes())
}

fn write_assets<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    let project = p.project;
    for asset in &project.assets {
        p.add(&asset.path, &asset.content)?;
    }
    Ok(())
}

fn write_opf<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    let opf = content_opf(p.project);
    p.add("content.opf", opf.as_bytes())
}

fn write_ncx<W: Write + Seek>(p: &mut Package<'_, W>) -> Result<()> {
    let ncx = toc_ncx(p.project, &nav_points(p.project));
    p.add("toc.ncx", ncx.as_bytes())
}

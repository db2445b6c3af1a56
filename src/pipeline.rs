//! Build pipeline: manifest -> [`Project`] -> staged transforms -> EPUB.
//!
//! Each stage takes the project by value and hands it back (or fails).
//! Stages run in a fixed order; the first error stops the build before
//! anything is written.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let epub = bindery::build(Path::new("epub_info.json"), Path::new("out"))?;
//! println!("wrote {}", epub.display());
//! # Ok::<(), bindery::Error>(())
//! ```

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::Config;
use crate::epub::{EpubConfig, EpubWriter};
use crate::error::{Error, Result};
use crate::minify::{Minifier, Minify};
use crate::project::Project;
use crate::transform::{Normalizer, render_source, rewrite_css_urls};
use crate::util::{decode_text, snake_case};

/// Collaborators available to every stage.
pub struct Context<'a> {
    pub minifier: &'a dyn Minify,
}

pub type StageFn = fn(Project, &Context<'_>) -> Result<Project>;

/// A named pipeline stage.
#[derive(Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub run: StageFn,
}

/// The default stage order.
pub const STAGES: &[Stage] = &[
    Stage { name: "load_cover", run: load_cover },
    Stage { name: "normalize_text", run: normalize_text },
    Stage { name: "output_title", run: output_title },
    Stage { name: "rewrite_styles", run: rewrite_styles },
    Stage { name: "register_files", run: register_files },
];

/// Ordered list of stages sharing one [`Context`].
pub struct Pipeline<'a> {
    stages: Vec<Stage>,
    context: Context<'a>,
}

impl<'a> Pipeline<'a> {
    /// The default stages with the given minifier.
    pub fn new(minifier: &'a dyn Minify) -> Self {
        Self {
            stages: STAGES.to_vec(),
            context: Context { minifier },
        }
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|s| s.name)
    }

    pub fn run(&self, mut project: Project) -> Result<Project> {
        for stage in &self.stages {
            debug!("stage {}", stage.name);
            project = (stage.run)(project, &self.context)?;
        }
        Ok(project)
    }
}

/// Build the book described by `config_path` into `out_dir`.
///
/// Returns the path of the written `.epub`.
pub fn build(config_path: &Path, out_dir: &Path) -> Result<PathBuf> {
    build_with(config_path, out_dir, &Minifier, EpubConfig::default())
}

/// [`build`] with an explicit minifier and writer configuration.
pub fn build_with(
    config_path: &Path,
    out_dir: &Path,
    minifier: &dyn Minify,
    epub_config: EpubConfig,
) -> Result<PathBuf> {
    let config = Config::load(config_path)?;
    debug!("loaded {} ({})", config_path.display(), config.title);

    let project = Pipeline::new(minifier).run(Project::from_config(&config))?;
    let path = EpubWriter::new()
        .with_config(epub_config)
        .write(&project, out_dir)?;

    info!("wrote {}", path.display());
    Ok(path)
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::io(path, e))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// Decode the cover image, if one is configured.
pub fn load_cover(mut project: Project, _ctx: &Context<'_>) -> Result<Project> {
    let Some(path) = project.sources.cover_image.clone() else {
        return Ok(project);
    };

    let bytes = read(&path)?;
    let cover = image::load_from_memory(&bytes).map_err(|source| Error::Image {
        path: path.clone(),
        source,
    })?;
    debug!("cover {}x{}", cover.width(), cover.height());

    project.cover = Some(cover);
    Ok(project)
}

/// Render, minify and normalize every text source into one body.
pub fn normalize_text(mut project: Project, ctx: &Context<'_>) -> Result<Project> {
    let sources = project.sources.text.clone();
    let mut normalizer = Normalizer {
        assets: &mut project.assets,
        headings: &mut project.headings,
        capitalize_headings: project.flags.capitalize_headings,
    };

    for path in &sources {
        let bytes = read(path)?;
        let markup = render_source(path, &bytes)?;
        let minified = ctx.minifier.minify("text/xml", markup.as_bytes())?;
        let body = normalizer.normalize(&String::from_utf8_lossy(&minified), parent_dir(path))?;

        debug!("normalized {} ({} bytes)", path.display(), body.len());
        project.text.extend_from_slice(body.as_bytes());
    }

    Ok(project)
}

/// Derive the archive file stem from the title.
pub fn output_title(mut project: Project, _ctx: &Context<'_>) -> Result<Project> {
    project.output_title = snake_case(&project.metadata.title);
    Ok(project)
}

/// Register stylesheet `url()` targets, rewrite them and minify the result.
pub fn rewrite_styles(mut project: Project, ctx: &Context<'_>) -> Result<Project> {
    let Some(path) = project.sources.styles.clone() else {
        return Ok(project);
    };

    let bytes = read(&path)?;
    let css = decode_text(&bytes, None);
    let base_dir = parent_dir(&path);

    let assets = &mut project.assets;
    let rewritten = rewrite_css_urls(&css, |url| {
        Ok(assets.register(&base_dir.join(url))?.path.clone())
    })?;

    let styles = ctx.minifier.minify("text/css", rewritten.as_bytes())?;
    if styles.is_empty() {
        warn!("stylesheet {} has no content", path.display());
    }

    project.styles = styles;
    Ok(project)
}

/// Register the extra files listed in the manifest.
pub fn register_files(mut project: Project, _ctx: &Context<'_>) -> Result<Project> {
    for path in &project.sources.files {
        project.assets.register(path)?;
    }
    Ok(project)
}

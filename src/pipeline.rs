use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::ProjectError;
use crate::fetch::Fetcher;
use crate::html::{self, SOURCE_TEXTAREA_ID};
use crate::okh::image::WikiImageResolver;
use crate::okh::users::IdentityUsers;
use crate::okh::{to_okh, ImageStatus, Mapped};
use crate::output;
use crate::parser::{infobox, RawInfobox};
use crate::projects::Project;
use crate::sanitize::cache_key;
use crate::settings::Settings;

/// Counts reported after a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub written: usize,
    pub no_infobox: usize,
    pub failed: usize,
    /// Written, but the image file name could not be resolved
    pub images_unresolved: usize,
    /// Infobox lines skipped as malformed, over all projects
    pub malformed_lines: usize,
}

#[derive(Debug)]
pub enum Outcome {
    Written { path: PathBuf, mapped: Mapped },
    NoInfobox,
}

/// Fetch the edit page of a project and extract its infobox.
pub fn load_infobox<F: Fetcher>(
    fetcher: &F,
    settings: &Settings,
    project: &Project,
) -> Result<Option<RawInfobox>, ProjectError> {
    let cache_name = format!("project_edit__{}.html", cache_key(&project.title));
    let page = fetcher.fetch(&settings.edit_url(&project.title), &cache_name)?;
    let source = html::textarea_contents(&page, SOURCE_TEXTAREA_ID).ok_or(ProjectError::NoSource)?;
    Ok(infobox::extract(&source))
}

pub fn map_project<F: Fetcher>(
    fetcher: &F,
    settings: &Settings,
    project: &Project,
) -> Result<Option<(RawInfobox, Mapped)>, ProjectError> {
    let Some(infobox) = load_infobox(fetcher, settings, project)? else {
        return Ok(None);
    };
    let images = WikiImageResolver::new(fetcher, settings.base_url());
    let mapped = to_okh(&infobox, project, &images, &IdentityUsers);
    Ok(Some((infobox, mapped)))
}

/// Fetch, parse, map and write one project.
pub fn process_project<F: Fetcher>(
    fetcher: &F,
    settings: &Settings,
    project: &Project,
    stats: &mut RunStats,
) -> Result<Outcome, ProjectError> {
    let Some((infobox, mapped)) = map_project(fetcher, settings, project)? else {
        info!("{}: no project infobox, skipped", project.title);
        return Ok(Outcome::NoInfobox);
    };
    stats.malformed_lines += infobox.malformed().len();
    if infobox.is_empty() {
        warn!("{}: infobox has no fields", project.title);
    }

    let path = output::write_manifest(&settings.storage_dir, &project.title, &mapped.record)?;
    Ok(Outcome::Written { path, mapped })
}

/// Process every title, one at a time. A failing project is logged and
/// counted; it never stops the run.
pub fn run<F: Fetcher>(fetcher: &F, settings: &Settings, titles: &[String]) -> RunStats {
    let pb = ProgressBar::new(titles.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut stats = RunStats {
        total: titles.len(),
        ..RunStats::default()
    };

    for title in titles {
        let project = Project::new(title, settings);
        pb.set_message(title.clone());
        match process_project(fetcher, settings, &project, &mut stats) {
            Ok(Outcome::Written { path, mapped }) => {
                info!("Written to {:?}", path);
                stats.written += 1;
                if matches!(mapped.image, ImageStatus::Unresolved(_)) {
                    stats.images_unresolved += 1;
                }
            }
            Ok(Outcome::NoInfobox) => stats.no_infobox += 1,
            Err(e) => {
                warn!("{}: {}", project.title, e);
                stats.failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Processed {} projects ({} written, {} without infobox, {} failed)",
        stats.total, stats.written, stats.no_infobox, stats.failed
    );
    stats
}

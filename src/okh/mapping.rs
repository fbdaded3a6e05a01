//! Appropedia infobox fields to OKH v2 manifest.
//!
//! | infobox                         | OKH                          |
//! |---------------------------------|------------------------------|
//! | `title` (else page title)       | `name`                       |
//! | page URL                        | `repo`                       |
//! | `authors` / `author`            | `licensor`                   |
//! | `image`                         | `image`                      |
//! | `keywords`, `caption`           | `function`                   |
//! | `language-code`                 | `documentation-language`     |
//! | `replicated`, `replicated-in`,  | `technology-readiness-level` |
//! | `made`, `status`                |                              |

use std::collections::HashSet;

use tracing::warn;

use super::image::{is_url, ImageResolver};
use super::record::{Licensor, OkhRecord, ReadinessLevel};
use super::users::{UserResolver, USER_PREFIX};
use crate::error::ResolveError;
use crate::parser::RawInfobox;
use crate::projects::Project;

/// `status` values that mean the design has been built and proven.
pub const PROVEN_STATUSES: &[&str] = &["Commercialized", "Deployed", "Implemented", "Verified"];
pub const PROTOTYPE_STATUS: &str = "Prototype";

/// How the `image` field was handled.
#[derive(Debug)]
pub enum ImageStatus {
    /// No (or an empty) `image` field
    Absent,
    /// Already a URL, used verbatim
    Verbatim,
    /// File name resolved to a URL
    Resolved,
    /// File name given, but no URL found; the record carries no image
    Unresolved(ResolveError),
}

#[derive(Debug)]
pub struct Mapped {
    pub record: OkhRecord,
    pub image: ImageStatus,
}

pub fn to_okh<R, U>(
    infobox: &RawInfobox,
    project: &Project,
    images: &R,
    users: &U,
) -> Mapped
where
    R: ImageResolver,
    U: UserResolver,
{
    let name = infobox
        .get("title")
        .filter(|t| !t.is_empty())
        .unwrap_or(project.title.as_str());

    let mut record = OkhRecord::new(name, project.url.as_str());
    record.licensor = Licensor::from_authors(authors(infobox, users));

    let (image, status) = resolve_image(infobox, project, images);
    record.image = image;
    record.function = function(infobox);
    record.documentation_language = infobox.get("language-code").map(str::to_string);

    // Readiness is only emitted alongside an image. Whether that rule is
    // intended upstream is unknown; it is kept as observed.
    if record.image.is_some() {
        record.technology_readiness_level = readiness(infobox);
    }

    Mapped {
        record,
        image: status,
    }
}

/// Comma-separated `authors` (or `author`), trimmed, empty entries dropped.
/// `User:` entries go through the user resolver.
pub fn authors<U: UserResolver>(infobox: &RawInfobox, users: &U) -> Vec<String> {
    let Some(raw) = infobox.get("authors").or_else(|| infobox.get("author")) else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| match a.strip_prefix(USER_PREFIX) {
            Some(user) => users.resolve_user(user),
            None => a.to_string(),
        })
        .collect()
}

fn resolve_image<R: ImageResolver>(
    infobox: &RawInfobox,
    project: &Project,
    images: &R,
) -> (Option<String>, ImageStatus) {
    let Some(raw) = infobox.get("image").filter(|v| !v.is_empty()) else {
        return (None, ImageStatus::Absent);
    };
    if is_url(raw) {
        return (Some(raw.to_string()), ImageStatus::Verbatim);
    }
    match images.resolve(&project.title, raw) {
        Ok(url) => (Some(url), ImageStatus::Resolved),
        Err(e) => {
            warn!("{}: image dropped: {}", project.title, e);
            (None, ImageStatus::Unresolved(e))
        }
    }
}

/// `"<keywords> - <caption>"`, or whichever of the two is present.
pub fn function(infobox: &RawInfobox) -> Option<String> {
    match (infobox.get("keywords"), infobox.get("caption")) {
        (Some(k), Some(c)) => Some(format!("{} - {}", k, c)),
        (Some(k), None) => Some(k.to_string()),
        (None, Some(c)) => Some(c.to_string()),
        (None, None) => None,
    }
}

/// First match wins: replicated, made, then the `status` list.
pub fn readiness(infobox: &RawInfobox) -> Option<ReadinessLevel> {
    let replicated = infobox.get("replicated") == Some("Yes")
        || infobox
            .get("replicated-in")
            .is_some_and(|v| !v.trim().is_empty());
    if replicated {
        return Some(ReadinessLevel::Otrl5);
    }
    if infobox.get("made") == Some("Yes") {
        return Some(ReadinessLevel::Otrl4);
    }

    let status = infobox.get("status")?;
    let tokens: HashSet<&str> = status.split(',').map(str::trim).collect();
    if PROVEN_STATUSES.iter().any(|s| tokens.contains(s)) {
        Some(ReadinessLevel::Otrl5)
    } else if tokens.contains(PROTOTYPE_STATUS) {
        Some(ReadinessLevel::Otrl4)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::okh::users::IdentityUsers;
    use crate::parser::infobox;
    use std::cell::Cell;

    const IMG_URL: &str = "https://www.appropedia.org/w/images/1/1a/Widget.jpg";

    fn project(title: &str) -> Project {
        Project {
            title: title.to_string(),
            url: format!("https://www.appropedia.org/{}", title),
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> RawInfobox {
        pairs.iter().copied().collect()
    }

    /// Resolves every file name to the same URL, counting calls.
    struct FixedImages(Cell<usize>);

    impl FixedImages {
        fn new() -> Self {
            FixedImages(Cell::new(0))
        }
    }

    impl ImageResolver for FixedImages {
        fn resolve(&self, _title: &str, _image: &str) -> Result<String, ResolveError> {
            self.0.set(self.0.get() + 1);
            Ok(IMG_URL.to_string())
        }
    }

    struct NoImages;

    impl ImageResolver for NoImages {
        fn resolve(&self, _title: &str, image: &str) -> Result<String, ResolveError> {
            Err(ResolveError::NotFound(image.to_string()))
        }
    }

    struct PanicImages;

    impl ImageResolver for PanicImages {
        fn resolve(&self, _title: &str, _image: &str) -> Result<String, ResolveError> {
            panic!("resolver must not be called for URL images");
        }
    }

    struct Shouting;

    impl UserResolver for Shouting {
        fn resolve_user(&self, user_name: &str) -> String {
            user_name.to_uppercase()
        }
    }

    fn map(pairs: &[(&str, &str)]) -> OkhRecord {
        to_okh(&fields(pairs), &project("Widget"), &FixedImages::new(), &IdentityUsers).record
    }

    #[test]
    fn licensor_two_authors_is_sequence() {
        let r = map(&[("authors", "A, B")]);
        assert_eq!(r.licensor, Some(Licensor::Many(vec!["A".into(), "B".into()])));
    }

    #[test]
    fn licensor_one_author_is_string() {
        let r = map(&[("authors", "A")]);
        assert_eq!(r.licensor, Some(Licensor::One("A".into())));
    }

    #[test]
    fn licensor_absent_without_authors() {
        assert_eq!(map(&[("title", "Widget")]).licensor, None);
        assert_eq!(map(&[("authors", " , ")]).licensor, None);
    }

    #[test]
    fn author_fallback_and_precedence() {
        assert_eq!(
            map(&[("author", "Solo")]).licensor,
            Some(Licensor::One("Solo".into()))
        );
        assert_eq!(
            map(&[("author", "Ignored"), ("authors", "Used")]).licensor,
            Some(Licensor::One("Used".into()))
        );
    }

    #[test]
    fn wiki_users_go_through_resolver() {
        let ib = fields(&[("authors", "User:jdoe, Real Name")]);
        assert_eq!(authors(&ib, &IdentityUsers), vec!["jdoe", "Real Name"]);
        assert_eq!(authors(&ib, &Shouting), vec!["JDOE", "Real Name"]);
    }

    #[test]
    fn function_composition() {
        assert_eq!(
            map(&[("keywords", "gadget"), ("caption", "small")]).function.as_deref(),
            Some("gadget - small")
        );
        assert_eq!(map(&[("keywords", "gadget")]).function.as_deref(), Some("gadget"));
        assert_eq!(map(&[("caption", "small")]).function.as_deref(), Some("small"));
        assert_eq!(map(&[]).function, None);
    }

    #[test]
    fn language_passthrough() {
        assert_eq!(
            map(&[("language-code", "es")]).documentation_language.as_deref(),
            Some("es")
        );
        assert_eq!(map(&[]).documentation_language, None);
    }

    #[test]
    fn fixed_fields() {
        let r = map(&[]);
        assert_eq!(r.name, "Widget");
        assert_eq!(r.repo, "https://www.appropedia.org/Widget");
        assert_eq!(r.license, "CC-BY-SA 4.0");
        assert_eq!(r.okhv, "2.0");
    }

    #[test]
    fn infobox_title_overrides_page_title() {
        let r = to_okh(
            &fields(&[("title", "Solar Oven")]),
            &project("Solar_oven_v2"),
            &FixedImages::new(),
            &IdentityUsers,
        )
        .record;
        assert_eq!(r.name, "Solar Oven");
        assert_eq!(r.repo, "https://www.appropedia.org/Solar_oven_v2");
    }

    #[test]
    fn readiness_prototype_is_second_tier() {
        assert_eq!(
            readiness(&fields(&[("status", "Prototype")])),
            Some(ReadinessLevel::Otrl4)
        );
        assert_eq!(
            readiness(&fields(&[("status", "Design, Prototype")])),
            Some(ReadinessLevel::Otrl4)
        );
    }

    #[test]
    fn readiness_replicated_beats_status() {
        assert_eq!(
            readiness(&fields(&[("replicated", "Yes"), ("status", "Idea")])),
            Some(ReadinessLevel::Otrl5)
        );
        assert_eq!(
            readiness(&fields(&[("replicated-in", "Kenya"), ("made", "No")])),
            Some(ReadinessLevel::Otrl5)
        );
    }

    #[test]
    fn readiness_priority_order() {
        assert_eq!(
            readiness(&fields(&[("made", "Yes"), ("status", "Deployed")])),
            Some(ReadinessLevel::Otrl4)
        );
        assert_eq!(
            readiness(&fields(&[("replicated-in", ""), ("status", "Verified")])),
            Some(ReadinessLevel::Otrl5)
        );
        assert_eq!(
            readiness(&fields(&[("replicated", "No"), ("made", "No"), ("status", "Idea")])),
            None
        );
        assert_eq!(readiness(&fields(&[])), None);
    }

    #[test]
    fn url_image_used_verbatim() {
        let m = to_okh(
            &fields(&[("image", "https://example.org/w.png"), ("made", "Yes")]),
            &project("Widget"),
            &PanicImages,
            &IdentityUsers,
        );
        assert!(matches!(m.image, ImageStatus::Verbatim));
        assert_eq!(m.record.image.as_deref(), Some("https://example.org/w.png"));
        assert_eq!(m.record.technology_readiness_level, Some(ReadinessLevel::Otrl4));
    }

    #[test]
    fn file_image_resolved_once() {
        let images = FixedImages::new();
        let m = to_okh(
            &fields(&[("image", "Widget.jpg"), ("status", "Prototype")]),
            &project("Widget"),
            &images,
            &IdentityUsers,
        );
        assert_eq!(images.0.get(), 1);
        assert!(matches!(m.image, ImageStatus::Resolved));
        assert_eq!(m.record.image.as_deref(), Some(IMG_URL));
        assert_eq!(m.record.technology_readiness_level, Some(ReadinessLevel::Otrl4));
    }

    #[test]
    fn readiness_needs_an_image() {
        let r = map(&[("status", "Prototype")]);
        assert_eq!(r.image, None);
        assert_eq!(r.technology_readiness_level, None);
    }

    #[test]
    fn image_without_tier_omits_readiness() {
        let r = map(&[("image", "Widget.jpg"), ("status", "Idea")]);
        assert!(r.image.is_some());
        assert_eq!(r.technology_readiness_level, None);
    }

    #[test]
    fn unresolved_image_degrades_record() {
        let m = to_okh(
            &fields(&[("image", "Gone.jpg"), ("replicated", "Yes")]),
            &project("Widget"),
            &NoImages,
            &IdentityUsers,
        );
        assert!(matches!(m.image, ImageStatus::Unresolved(ResolveError::NotFound(_))));
        assert_eq!(m.record.image, None);
        assert_eq!(m.record.technology_readiness_level, None);
    }

    #[test]
    fn empty_image_is_absent() {
        let m = to_okh(
            &fields(&[("image", "")]),
            &project("Widget"),
            &PanicImages,
            &IdentityUsers,
        );
        assert!(matches!(m.image, ImageStatus::Absent));
    }

    #[test]
    fn widget_end_to_end() {
        let src = "{{Infobox project\n|title=Widget\n|authors=Jane Doe\n|status=Prototype\n\
                   |keywords=gadget\n|caption=a small widget\n}}";
        let ib = infobox::extract(src).unwrap();
        let m = to_okh(&ib, &project("Widget"), &PanicImages, &IdentityUsers);
        assert!(matches!(m.image, ImageStatus::Absent));
        let r = m.record;
        assert_eq!(r.name, "Widget");
        assert_eq!(r.licensor, Some(Licensor::One("Jane Doe".into())));
        assert_eq!(r.function.as_deref(), Some("gadget - a small widget"));
        assert_eq!(r.technology_readiness_level, None);
    }

    #[test]
    fn mapping_is_idempotent() {
        let ib = fields(&[("authors", "A, B"), ("image", "W.jpg"), ("made", "Yes")]);
        let a = to_okh(&ib, &project("Widget"), &FixedImages::new(), &IdentityUsers).record;
        let b = to_okh(&ib, &project("Widget"), &FixedImages::new(), &IdentityUsers).record;
        assert_eq!(a, b);
    }
}

//! Images as reported by `GET /images/json`, and the derived values we
//! export for each of them.

use std::collections::HashMap;

use crate::errors::*;

/// Placeholder for a repository or tag the image doesn't have.
pub const NONE_PLACEHOLDER: &str = "<none>";

/// Length of the `sha256:` prefix on image IDs.
pub const ID_PREFIX_LEN: usize = 7;

/// Number of hex digits in a short image ID, as shown by `docker images`.
pub const SHORT_ID_LEN: usize = 12;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[allow(non_snake_case)]
pub struct Image {
    pub Id: String,
    #[serde(default)]
    pub RepoTags: Option<Vec<String>>,
    #[serde(default)]
    pub RepoDigests: Option<Vec<String>>,
    pub Created: i64,
    pub Size: i64,
    #[serde(default)]
    pub SharedSize: i64,
    /// Dropped by API 1.44 and later, where it always equalled `Size`.
    #[serde(default)]
    pub VirtualSize: Option<i64>,
    #[serde(default)]
    pub Containers: i64,
    #[serde(default)]
    pub Labels: Option<HashMap<String, String>>,
}

impl Image {
    /// The 12-digit short ID, skipping the `sha256:` prefix.
    ///
    /// Requires `Id` to be at least `ID_PREFIX_LEN + SHORT_ID_LEN` bytes.
    pub fn short_id(&self) -> Result<&str> {
        self.Id
            .get(ID_PREFIX_LEN..ID_PREFIX_LEN + SHORT_ID_LEN)
            .ok_or_else(|| ErrorKind::MalformedImageId(self.Id.clone()).into())
    }

    pub fn virtual_size(&self) -> i64 {
        self.VirtualSize.unwrap_or(self.Size)
    }

    /// Labels as `(key, value)` pairs, sorted by key so that output is
    /// stable from one run to the next.
    pub fn labels(&self) -> Vec<(&str, &str)> {
        let mut labels: Vec<(&str, &str)> = self
            .Labels
            .iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        labels.sort();
        labels
    }

    /// One `(repository, tag)` pair per row we should emit for this image.
    ///
    /// Untagged images yield a single pair: their first digest (or
    /// `<none>`) and a `<none>` tag.
    pub fn repo_tag_pairs(&self) -> Vec<(&str, &str)> {
        let tags = self.RepoTags.as_deref().unwrap_or_default();
        if !tags.is_empty() {
            return tags.iter().map(|t| split_repo_tag(t)).collect();
        }
        let repo = self
            .RepoDigests
            .as_deref()
            .and_then(|digests| digests.first())
            .map(String::as_str)
            .unwrap_or(NONE_PLACEHOLDER);
        vec![(repo, NONE_PLACEHOLDER)]
    }
}

/// Split `repository:tag` at the last colon, so that registry ports survive:
/// `registry:5000/app:v1` is `("registry:5000/app", "v1")`. Without a colon
/// the whole string is the repository and the tag is empty.
pub fn split_repo_tag(repo_tag: &str) -> (&str, &str) {
    match repo_tag.rfind(':') {
        Some(idx) => (&repo_tag[..idx], &repo_tag[idx + 1..]),
        None => (repo_tag, ""),
    }
}

/// Format a byte count as megabytes with exactly two decimals.
pub fn format_megabytes(bytes: i64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MB)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tags: &[&str], digests: &[&str]) -> Image {
        Image {
            Id: "sha256:0123456789abcdef0123456789abcdef".to_owned(),
            RepoTags: Some(tags.iter().map(|s| s.to_string()).collect()),
            RepoDigests: Some(digests.iter().map(|s| s.to_string()).collect()),
            ..Image::default()
        }
    }

    #[test]
    fn splits_on_the_last_colon() {
        assert_eq!(
            split_repo_tag("registry:5000/app:v1"),
            ("registry:5000/app", "v1")
        );
        assert_eq!(split_repo_tag("nginx:latest"), ("nginx", "latest"));
        assert_eq!(split_repo_tag("nginx"), ("nginx", ""));
        assert_eq!(split_repo_tag("nginx:"), ("nginx", ""));
    }

    #[test]
    fn short_id_skips_the_prefix() {
        assert_eq!(image(&[], &[]).short_id().unwrap(), "0123456789ab");
    }

    #[test]
    fn short_id_rejects_short_ids() {
        let img = Image {
            Id: "sha256:abc".to_owned(),
            ..Image::default()
        };
        let err = img.short_id().unwrap_err();
        match err.kind() {
            ErrorKind::MalformedImageId(id) => assert_eq!(id, "sha256:abc"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn megabytes_always_have_two_decimals() {
        assert_eq!(format_megabytes(1_048_576), "1.00");
        assert_eq!(format_megabytes(0), "0.00");
        assert_eq!(format_megabytes(1_572_864), "1.50");
        assert_eq!(format_megabytes(77_842_678), "74.24");
        assert_eq!(format_megabytes(10_737_418_240), "10240.00");
    }

    #[test]
    fn untagged_images_fall_back_to_digest() {
        let img = image(&[], &["alpine@sha256:feed", "alpine@sha256:beef"]);
        assert_eq!(img.repo_tag_pairs(), vec![("alpine@sha256:feed", "<none>")]);
    }

    #[test]
    fn bare_images_are_all_none() {
        let img = Image {
            Id: "sha256:0123456789abcdef".to_owned(),
            ..Image::default()
        };
        assert_eq!(img.repo_tag_pairs(), vec![("<none>", "<none>")]);
    }

    #[test]
    fn every_tag_is_a_pair() {
        let img = image(&["app:1", "app:latest"], &["app@sha256:feed"]);
        assert_eq!(img.repo_tag_pairs(), vec![("app", "1"), ("app", "latest")]);
    }

    #[test]
    fn labels_are_sorted_by_key() {
        let mut labels = HashMap::new();
        labels.insert("b".to_owned(), "2".to_owned());
        labels.insert("a".to_owned(), "1".to_owned());
        let img = Image {
            Labels: Some(labels),
            ..Image::default()
        };
        assert_eq!(img.labels(), vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn virtual_size_falls_back_to_size() {
        let img = Image {
            Size: 42,
            ..Image::default()
        };
        assert_eq!(img.virtual_size(), 42);
    }
}

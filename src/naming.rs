use std::path::{Component, Path, PathBuf};

pub const CLASS_SUFFIX: &str = ".class";

/// Compiled descriptors that never describe an annotatable type.
pub const RESERVED_FILES: [&str; 2] = ["module-info.class", "package-info.class"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateCheck {
    Accepted,
    WrongSuffix,
    Reserved,
}

impl CandidateCheck {
    pub fn is_accepted(self) -> bool {
        matches!(self, CandidateCheck::Accepted)
    }
}

pub fn check_candidate(file_name: &str) -> CandidateCheck {
    if !file_name.ends_with(CLASS_SUFFIX) || file_name.len() == CLASS_SUFFIX.len() {
        return CandidateCheck::WrongSuffix;
    }
    if RESERVED_FILES.contains(&file_name) {
        return CandidateCheck::Reserved;
    }
    CandidateCheck::Accepted
}

/// Joins each package segment under `root`. Separators, `..`, and absolute
/// or prefixed segments are dropped so the result never leaves `root`.
pub fn package_to_path(root: &Path, package: &str) -> PathBuf {
    package
        .split(['.', '/', '\\'])
        .filter(|segment| is_plain_segment(segment))
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Maps `<root>/a/b/C.class` to `a.b.C`. Returns `None` when the path is not
/// below `root`, lacks the class suffix, or is not valid UTF-8.
pub fn path_to_identifier(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => segments.push(part.to_str()?),
            _ => return None,
        }
    }

    let last = segments.pop()?;
    let simple_name = last.strip_suffix(CLASS_SUFFIX)?;
    if simple_name.is_empty() {
        return None;
    }
    segments.push(simple_name);
    Some(segments.join("."))
}

#[cfg(test)]
fn identifier_to_path(root: &Path, identifier: &str) -> PathBuf {
    let mut path = package_to_path(root, identifier);
    let mut file_name = path.file_name().unwrap_or_default().to_os_string();
    file_name.push(CLASS_SUFFIX);
    path.set_file_name(file_name);
    path
}

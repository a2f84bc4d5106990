//! Input discovery and output planning.
//!
//! Subdirectories of the input that hold `.msg` files are grouped by the
//! first six characters of their name. A group with two or more members is a
//! language category: its directories, in hexadecimal order, map onto the
//! configured language labels. Every other directory is "misc" and keeps its
//! own name under the misc folder.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MsgError, Result};

use super::ExtractOptions;

/// Length of the category key prefix.
pub const CATEGORY_KEY_LEN: usize = 6;

/// One input subdirectory and the `.msg` files it contains (sorted).
#[derive(Debug, Clone)]
pub struct SourceDir {
    pub path: PathBuf,
    pub name: String,
    pub files: Vec<PathBuf>,
}

/// A category of two or more directories, one per language.
#[derive(Debug, Clone)]
pub struct Category {
    pub key: String,
    /// Directories in hexadecimal order, paired with their language label.
    pub dirs: Vec<(SourceDir, String)>,
}

/// All files headed for one destination directory.
///
/// Several categories can target the same language folder, so a job may
/// gather files from many source directories. The job is processed by a
/// single worker with one name registry.
#[derive(Debug, Clone)]
pub struct OutputJob {
    pub dest: PathBuf,
    pub files: Vec<PathBuf>,
}

/// The full extraction plan.
#[derive(Debug, Clone, Default)]
pub struct ExtractPlan {
    pub categories: Vec<Category>,
    pub misc: Vec<SourceDir>,
    pub jobs: Vec<OutputJob>,
}

impl ExtractPlan {
    /// Number of `.msg` files across all jobs.
    pub fn total_files(&self) -> usize {
        self.jobs.iter().map(|j| j.files.len()).sum()
    }
}

/// List input subdirectories that contain at least one `.msg` file.
///
/// Directories and files come back sorted by name.
pub fn scan_input(input: &Path) -> Result<Vec<SourceDir>> {
    let read = std::fs::read_dir(input).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MsgError::InputNotFound(input.to_path_buf())
        } else {
            MsgError::io(input, e)
        }
    })?;

    let mut dirs = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| MsgError::io(input, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let files = match msg_files(&path) {
            Ok(files) => files,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };
        if files.is_empty() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        dirs.push(SourceDir { path, name, files });
    }
    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(dirs)
}

/// Sorted `.msg` files directly inside `dir` (extension is case-insensitive).
fn msg_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| MsgError::io(dir, e))? {
        let path = entry.map_err(|e| MsgError::io(dir, e))?.path();
        let is_msg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("msg"));
        if is_msg && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// First six characters of a directory name (the whole name if shorter).
pub fn category_key(name: &str) -> &str {
    match name.char_indices().nth(CATEGORY_KEY_LEN) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

/// Order directory names by their hexadecimal value.
///
/// Names that are not valid hex sort after all hex names, by plain string order.
pub fn hex_order(a: &str, b: &str) -> Ordering {
    match (u64::from_str_radix(a, 16), u64::from_str_radix(b, 16)) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Group `dirs` into categories and misc directories and build output jobs.
pub fn build_plan(dirs: Vec<SourceDir>, opts: &ExtractOptions) -> ExtractPlan {
    let mut groups: BTreeMap<String, Vec<SourceDir>> = BTreeMap::new();
    for dir in dirs {
        groups
            .entry(category_key(&dir.name).to_string())
            .or_default()
            .push(dir);
    }

    let mut plan = ExtractPlan::default();
    for (key, mut members) in groups {
        if members.len() < 2 {
            plan.misc.append(&mut members);
            continue;
        }
        members.sort_by(|a, b| hex_order(&a.name, &b.name));
        let dirs = members
            .into_iter()
            .enumerate()
            .map(|(i, dir)| {
                let label = match opts.languages.get(i) {
                    Some(lang) => lang.clone(),
                    None => {
                        warn!(
                            category = %key,
                            dir = %dir.name,
                            "More directories than language labels, using directory name"
                        );
                        dir.name.clone()
                    }
                };
                (dir, label)
            })
            .collect();
        plan.categories.push(Category { key, dirs });
    }
    plan.misc.sort_by(|a, b| hex_order(&a.name, &b.name));

    let mut index: HashMap<PathBuf, usize> = HashMap::new();
    let mut push = |jobs: &mut Vec<OutputJob>, dest: PathBuf, files: &[PathBuf]| {
        let slot = *index.entry(dest.clone()).or_insert_with(|| {
            jobs.push(OutputJob {
                dest,
                files: Vec::new(),
            });
            jobs.len() - 1
        });
        jobs[slot].files.extend_from_slice(files);
    };

    let mut jobs = Vec::new();
    for category in &plan.categories {
        for (dir, label) in &category.dirs {
            push(&mut jobs, opts.output.join(label), dir.files.as_slice());
        }
    }
    for dir in &plan.misc {
        let dest = opts.output.join(&opts.misc_dir).join(&dir.name);
        push(&mut jobs, dest, dir.files.as_slice());
    }
    plan.jobs = jobs;

    debug!(
        categories = plan.categories.len(),
        misc = plan.misc.len(),
        jobs = plan.jobs.len(),
        files = plan.total_files(),
        "Built extraction plan"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn dir(name: &str, files: &[&str]) -> SourceDir {
        let path = PathBuf::from("in").join(name);
        SourceDir {
            files: files.iter().map(|f| path.join(f)).collect(),
            path,
            name: name.to_string(),
        }
    }

    fn opts() -> ExtractOptions {
        ExtractOptions::from_config(&Config::default(), "in", "out")
    }

    #[test]
    fn test_category_key() {
        assert_eq!(category_key("0A1B2C03"), "0A1B2C");
        assert_eq!(category_key("ABC"), "ABC");
        assert_eq!(category_key("ÄÖÜäöüß"), "ÄÖÜäöü");
    }

    #[test]
    fn test_hex_order() {
        let mut names = vec!["0000000A", "00000002", "zz", "00000010", "aa"];
        names.sort_by(|a, b| hex_order(a, b));
        assert_eq!(names, vec!["00000002", "0000000A", "00000010", "aa", "zz"]);
    }

    #[test]
    fn test_categories_map_to_languages() {
        let dirs = vec![
            dir("1234560B", &["a.msg"]),
            dir("1234560A", &["b.msg"]),
            dir("ABCDEF00", &["c.msg"]),
        ];
        let plan = build_plan(dirs, &opts());
        assert_eq!(plan.categories.len(), 1);
        let cat = &plan.categories[0];
        assert_eq!(cat.key, "123456");
        assert_eq!(cat.dirs[0].0.name, "1234560A");
        assert_eq!(cat.dirs[0].1, "ja");
        assert_eq!(cat.dirs[1].1, "en");
        assert_eq!(plan.misc.len(), 1);
        assert_eq!(plan.misc[0].name, "ABCDEF00");

        let dests: Vec<&Path> = plan.jobs.iter().map(|j| j.dest.as_path()).collect();
        assert_eq!(
            dests,
            vec![
                Path::new("out/ja"),
                Path::new("out/en"),
                Path::new("out/_misc/ABCDEF00"),
            ]
        );
        assert_eq!(plan.total_files(), 3);
    }

    #[test]
    fn test_shared_language_dir_is_one_job() {
        let dirs = vec![
            dir("11111100", &["a.msg"]),
            dir("11111101", &["b.msg"]),
            dir("22222200", &["c.msg", "d.msg"]),
            dir("22222201", &["e.msg"]),
        ];
        let plan = build_plan(dirs, &opts());
        assert_eq!(plan.categories.len(), 2);
        assert_eq!(plan.jobs.len(), 2);
        assert_eq!(plan.jobs[0].dest, PathBuf::from("out/ja"));
        assert_eq!(plan.jobs[0].files.len(), 3);
        assert_eq!(plan.jobs[1].files.len(), 2);
    }

    #[test]
    fn test_surplus_directories_use_own_name() {
        let mut o = opts();
        o.languages = vec!["en".to_string()];
        let dirs = vec![dir("AAAAAA01", &["a.msg"]), dir("AAAAAA02", &["b.msg"])];
        let plan = build_plan(dirs, &o);
        assert_eq!(plan.categories[0].dirs[1].1, "AAAAAA02");
        assert_eq!(plan.jobs[1].dest, PathBuf::from("out/AAAAAA02"));
    }

    #[test]
    fn test_scan_input_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("B0")).unwrap();
        std::fs::create_dir_all(root.join("A0")).unwrap();
        std::fs::create_dir_all(root.join("empty")).unwrap();
        std::fs::write(root.join("B0").join("2.msg"), b"x").unwrap();
        std::fs::write(root.join("B0").join("1.MSG"), b"x").unwrap();
        std::fs::write(root.join("B0").join("note.txt"), b"x").unwrap();
        std::fs::write(root.join("A0").join("z.msg"), b"x").unwrap();
        std::fs::write(root.join("empty").join("readme"), b"x").unwrap();
        std::fs::write(root.join("top.msg"), b"x").unwrap();

        let dirs = scan_input(root).unwrap();
        let names: Vec<&str> = dirs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A0", "B0"]);
        let files: Vec<String> = dirs[1]
            .files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["1.MSG", "2.msg"]);
    }

    #[test]
    fn test_scan_missing_input() {
        let err = scan_input(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, MsgError::InputNotFound(_)));
    }
}

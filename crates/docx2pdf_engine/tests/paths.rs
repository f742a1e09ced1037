use std::fs;
use std::path::{Path, PathBuf};

use docx2pdf_engine::{expand_inputs, is_docx, resolve_output_path};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn output_path_uses_selected_directory() {
    let out = resolve_output_path(Path::new("/a/report.docx"), Some(Path::new("/out")));
    assert_eq!(out, PathBuf::from("/out/report.pdf"));
}

#[test]
fn output_path_defaults_to_source_directory() {
    let out = resolve_output_path(Path::new("/a/b/notes.final.docx"), None);
    assert_eq!(out, PathBuf::from("/a/b/notes.final.pdf"));

    let bare = resolve_output_path(Path::new("letter.docx"), None);
    assert_eq!(bare, PathBuf::from("./letter.pdf"));
}

#[test]
fn docx_extension_is_case_insensitive() {
    assert!(is_docx(Path::new("/a/REPORT.DOCX")));
    assert!(is_docx(Path::new("x.docx")));
    assert!(!is_docx(Path::new("x.doc")));
    assert!(!is_docx(Path::new("docx")));
}

#[test]
fn directories_expand_to_sorted_docx_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for name in ["b.docx", "a.DOCX", "notes.txt", "~$b.docx"] {
        fs::write(root.join(name), "").unwrap();
    }
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("c.docx"), "").unwrap();

    let flat = expand_inputs(&[root.to_path_buf()], false).unwrap();
    assert_eq!(flat, vec![root.join("a.DOCX"), root.join("b.docx")]);

    let deep = expand_inputs(&[root.to_path_buf()], true).unwrap();
    assert_eq!(
        deep,
        vec![
            root.join("a.DOCX"),
            root.join("b.docx"),
            root.join("sub").join("c.docx"),
        ]
    );
}

#[test]
fn file_arguments_pass_through_in_order() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.docx");
    let other = temp.path().join("scan.odt");

    let files = expand_inputs(&[missing.clone(), other.clone()], false).unwrap();
    assert_eq!(files, vec![missing, other]);
}

#[test]
fn relative_arguments_become_absolute() {
    let files = expand_inputs(&[PathBuf::from("relative-report.docx")], false).unwrap();
    assert!(files[0].is_absolute());
    assert!(files[0].ends_with("relative-report.docx"));
}

#[cfg(unix)]
#[test]
fn recursion_skips_linked_directories() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("docs");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.docx"), "").unwrap();
    symlink(&root, root.join("loop")).unwrap();
    symlink(root.join("a.docx"), root.join("linked.docx")).unwrap();

    let files = expand_inputs(&[root.clone()], true).unwrap();
    assert_eq!(files, vec![root.join("a.docx"), root.join("linked.docx")]);
}

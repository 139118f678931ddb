//! Static vs dynamic lookups and whole-set reloads.

use std::sync::Arc;

use tasker_templates::{Collection, Context, TemplateError};

use crate::common::{render, template_tree, write_template};

#[test]
fn test_edits_to_template_and_included_file_are_picked_up() {
    let dir = template_tree(&[
        ("a.html", r#"A({% include "s/b.html" %})"#),
        ("s/b.html", "B()"),
        ("foo.bar", "What!?"),
    ]);
    let collection = Collection::new(dir.path(), ["*.html", "*.blah"], true).unwrap();
    assert_eq!(collection.template_set().len(), 2, "only 2 files match the patterns");

    assert_eq!(render(&collection, "a.html"), "A(B())");
    assert_eq!(render(&collection, "s/b.html"), "B()");
    assert!(collection.get("missing.html").unwrap_err().is_not_found());

    // No edits: same output, no reload.
    assert_eq!(render(&collection, "a.html"), "A(B())");
    assert_eq!(collection.reload_count(), 0);

    write_template(dir.path(), "a.html", r#"A(foo, {% include "s/b.html" %})"#);
    assert_eq!(render(&collection, "a.html"), "A(foo, B())");

    // Editing only the included file still refreshes the including template.
    write_template(dir.path(), "s/b.html", "B(bar)");
    assert_eq!(render(&collection, "a.html"), "A(foo, B(bar))");
    assert_eq!(collection.reload_count(), 2);

    assert!(collection.get("missing.html").unwrap_err().is_not_found());
}

#[test]
fn test_static_mode_never_rereads() {
    let dir = template_tree(&[
        ("a.html", r#"A({% include "s/b.html" %})"#),
        ("s/b.html", "B()"),
    ]);
    let collection = Collection::new(dir.path(), ["*.html"], false).unwrap();
    let before = collection.template_set();

    write_template(dir.path(), "a.html", "rewritten");
    write_template(dir.path(), "s/b.html", "rewritten");
    std::fs::remove_file(dir.path().join("s/b.html")).unwrap();

    assert_eq!(render(&collection, "a.html"), "A(B())");
    assert!(Arc::ptr_eq(&before, &collection.template_set()));
}

#[test]
fn test_any_valid_name_triggers_reload() {
    let dir = template_tree(&[
        ("a.html", r#"A({% include "s/b.html" %})"#),
        ("s/b.html", "B()"),
        ("other.html", "other"),
    ]);
    let collection = Collection::new(dir.path(), ["*.html"], true).unwrap();
    let before = collection.template_set();

    write_template(dir.path(), "s/b.html", "B(new)");
    assert_eq!(render(&collection, "other.html"), "other");
    assert!(!Arc::ptr_eq(&before, &collection.template_set()));

    // The reload done for other.html already covers a.html.
    assert_eq!(render(&collection, "a.html"), "A(B(new))");
    assert_eq!(collection.reload_count(), 1);
}

#[test]
fn test_template_set_does_not_check_staleness() {
    let dir = template_tree(&[("a.html", "A")]);
    let collection = Collection::new(dir.path(), ["*.html"], true).unwrap();
    let before = collection.template_set();

    write_template(dir.path(), "a.html", "A2");
    assert!(Arc::ptr_eq(&before, &collection.template_set()));
    assert_eq!(collection.reload_count(), 0);

    assert_eq!(render(&collection, "a.html"), "A2");
    assert_eq!(collection.template_set().render("a.html", &Context::new()).unwrap(), "A2");
}

#[test]
fn test_construction_fails_without_matches() {
    let dir = template_tree(&[("README.md", "# docs"), ("s/notes.txt", "notes")]);

    for dynamic in [false, true] {
        let err = Collection::new(dir.path(), ["*.html"], dynamic).unwrap_err();
        assert!(matches!(err, TemplateError::Empty { .. }));
    }
    assert!(Collection::new(dir.path(), ["*.txt"], true).is_ok());
}

#[test]
fn test_construction_fails_on_syntax_error() {
    let dir = template_tree(&[("a.html", "A"), ("bad.html", "{{ unclosed")]);
    let err = Collection::new(dir.path(), ["*.html"], false).unwrap_err();
    assert!(matches!(err, TemplateError::Compile { ref name, .. } if name == "bad.html"));
    assert!(err.to_string().contains("bad.html"));
}

#[test]
fn test_reload_failure_is_reported_and_retried() {
    let dir = template_tree(&[("a.html", "A"), ("b.html", "B")]);
    let collection = Collection::new(dir.path(), ["*.html"], true).unwrap();

    write_template(dir.path(), "b.html", "{% for %}");
    for _ in 0..2 {
        let err = collection.get("a.html").unwrap_err();
        assert!(matches!(err, TemplateError::Reload { .. }));
        assert!(err.to_string().contains("\"a.html\""));
    }
    assert_eq!(collection.template_set().render("b.html", &Context::new()).unwrap(), "B");

    write_template(dir.path(), "b.html", "B2");
    assert_eq!(render(&collection, "b.html"), "B2");
}

#[test]
fn test_rendering_with_context_and_autoescape() {
    let dir = template_tree(&[(
        "greet.html",
        "<p>Hello {{ user }} from {{ team | kebab_case }}</p>",
    )]);
    let collection = Collection::new(dir.path(), ["*.html"], true).unwrap();

    let mut context = Context::new();
    context.insert("user", "<ada>");
    context.insert("team", "CoreTeam");

    let mut out = Vec::new();
    collection
        .get("greet.html")
        .unwrap()
        .render_to(&context, &mut out)
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<p>Hello &lt;ada&gt; from core-team</p>"
    );
}

// Linux filesystems accept arbitrary bytes in file names.
#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_file_name_is_tracked_and_reloaded() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = template_tree(&[("a.html", "A")]);
    let raw = OsStr::from_bytes(b"\xffx.html");
    std::fs::write(dir.path().join(raw), "old").unwrap();
    std::fs::File::options()
        .write(true)
        .open(dir.path().join(raw))
        .unwrap()
        .set_modified(std::time::SystemTime::now() - std::time::Duration::from_secs(3600))
        .unwrap();

    let collection = Collection::new(dir.path(), ["*.html"], true).unwrap();
    assert_eq!(collection.template_set().len(), 2);
    assert_eq!(render(&collection, "\u{FFFD}x.html"), "old");
    assert_eq!(collection.reload_count(), 0);

    std::fs::write(dir.path().join(raw), "new").unwrap();
    assert_eq!(render(&collection, "a.html"), "A");
    assert_eq!(render(&collection, "\u{FFFD}x.html"), "new");
    assert_eq!(collection.reload_count(), 1);
}

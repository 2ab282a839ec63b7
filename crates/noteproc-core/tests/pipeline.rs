/*
 * tests/pipeline.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests running built pipelines over note markdown.
 */

use noteproc_core::{
    Destination, MemoryEngine, NoteProps, ProcDataInput, ProcFlavor, ProcMode, ProcOptions,
    ProcOutput, Vault, build_named, full_pipeline, parse_no_data, render_full,
};
use pretty_assertions::assert_eq;

fn workspace(fname: &str, dest: Destination) -> ProcDataInput {
    let engine = MemoryEngine::new("/ws")
        .with_note(
            NoteProps::new("n1", "home", "main")
                .with_title("Home")
                .with_custom("owner", "kim"),
        )
        .with_note(NoteProps::new("n2", "other", "main").with_title("Other"))
        .with_note(NoteProps::new("n3", "part", "main").with_body("# Part\n\nshared text"))
        .with_note(NoteProps::new("n4", "loop", "main").with_body("again ![[loop]]"))
        .into_arc();
    ProcDataInput::new()
        .with_engine(engine)
        .with_vault(Vault::new("main", "main"))
        .with_fname(fname)
        .with_dest(dest)
}

fn html(output: ProcOutput) -> String {
    match output {
        ProcOutput::Html(html) => html.replace('\n', ""),
        other => panic!("expected HTML output, got {other:?}"),
    }
}

fn markdown(output: ProcOutput) -> String {
    match output {
        ProcOutput::Markdown(text) => text,
        other => panic!("expected markdown output, got {other:?}"),
    }
}

#[test]
fn test_table_renders_header_and_body() {
    let mut pipeline = build_named(
        "NO_DATA",
        None,
        false,
        ProcDataInput::new().with_dest(Destination::Html),
    )
    .unwrap();
    let tree = pipeline.process("a | b\n--|--\n1 | 2").unwrap();
    let output = noteproc_core::to_html(&noteproc_core::to_hast(&tree).unwrap());
    assert_eq!(
        output.replace('\n', ""),
        "<table><thead><tr><th>a</th><th>b</th></tr></thead>\
         <tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
    );
}

#[test]
fn test_no_data_tags_become_links() {
    let mut pipeline = build_named(
        "NO_DATA",
        None,
        false,
        ProcDataInput::new().with_dest(Destination::MdRegular),
    )
    .unwrap();
    assert_eq!(
        markdown(pipeline.run("see #idea").unwrap()),
        "see [#idea](tags.idea)\n"
    );
    assert!(pipeline.diagnostics().is_empty());
}

#[test]
fn test_note_dialect_round_trips_references() {
    let mut pipeline = parse_no_data(Destination::MdDendron, ProcFlavor::Regular);
    let tree = pipeline.process("[[other]] and ![[part]]").unwrap();
    let mut kinds = Vec::new();
    tree.walk(&mut |node| kinds.push(node.type_name().to_string()));
    assert!(kinds.iter().any(|k| k == "wikiLink"));
    assert!(kinds.iter().any(|k| k == "noteRef"));
}

#[test]
fn test_render_regular_note() {
    let mut pipeline =
        render_full(workspace("home", Destination::Html), ProcFlavor::Regular).unwrap();
    let output = html(
        pipeline
            .run("Welcome to {{fm.title}}, see [[other]].")
            .unwrap(),
    );
    assert_eq!(
        output,
        r#"<h1 id="home">Home</h1><p>Welcome to Home, see <a href="other.html">other</a>.</p>"#
    );
    assert!(pipeline.diagnostics().is_empty());
}

#[test]
fn test_render_publishing_note() {
    let mut pipeline =
        render_full(workspace("home", Destination::Html), ProcFlavor::Publishing).unwrap();
    let output = html(pipeline.run("See [[other]] and $x$.").unwrap());
    assert!(output.starts_with(
        r##"<h1 id="home"><a aria-hidden="true" class="anchor-heading icon-link" href="#home"></a>Home</h1>"##
    ));
    assert!(output.contains(r#"<a href="/notes/n2.html">other</a>"#));
    assert!(output.contains(r#"<span class="katex">"#));
}

#[test]
fn test_broken_link_is_reported() {
    let mut pipeline =
        render_full(workspace("home", Destination::Html), ProcFlavor::Regular).unwrap();
    let output = html(pipeline.run("[[nowhere]]").unwrap());
    assert!(output.contains(r#"class="broken""#));
    assert_eq!(pipeline.diagnostics().len(), 1);
}

#[test]
fn test_html_note_refs_become_portals() {
    let mut pipeline =
        render_full(workspace("home", Destination::Html), ProcFlavor::Regular).unwrap();
    let output = html(pipeline.run("![[part]]").unwrap());
    assert!(output.contains(r#"<div class="portal-container"><h1 id="part">Part</h1><p>shared text</p></div>"#));
}

#[test]
fn test_markdown_note_refs_are_inlined() {
    let data = workspace("home", Destination::MdRegular);
    let mut pipeline = build_named("all data", None, false, data).unwrap();
    let output = markdown(pipeline.run("before\n\n![[part]]").unwrap());
    assert_eq!(output, "# Home\n\nbefore\n\n# Part\n\nshared text\n");
}

#[test]
fn test_note_ref_inside_reference_has_no_title() {
    let data = workspace("home", Destination::MdRegular).with_inside_note_ref(true);
    let mut pipeline = full_pipeline(data, ProcFlavor::Regular).unwrap();
    assert_eq!(markdown(pipeline.run("body").unwrap()), "body\n");
}

#[test]
fn test_note_ref_depth_limit() {
    let data = workspace("loop", Destination::MdRegular);
    let options = ProcOptions::new(ProcMode::Full).with_parse_only(false);
    let mut pipeline = noteproc_core::build(options, data).unwrap();
    pipeline.run("![[loop]]").unwrap();
    let diagnostics = pipeline.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].title.contains("maximum depth"));
    assert_eq!(diagnostics[0].stage.as_deref(), Some("note-refs"));
}

/*
 * builder.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Pipeline construction from processor options and partial data.
 */

//! Pipeline construction.
//!
//! [`build`] selects and orders the stages for a processor mode and flavor
//! and populates the pipeline context. The stage list is fixed once the
//! pipeline is returned.
//!
//! Every pipeline starts with the same stages, in this order:
//!
//! 1. `frontmatter`, `abbr`, `list-format`
//! 2. `note-refs` (markdown destinations only)
//! 3. `block-anchors`, `hashtags`, `user-tags`, `extended-image`,
//!    `footnotes`, `variables`, `backlinks-hover`
//! 4. `wiki-links`, unless link conversion is disabled
//!
//! [`ProcMode::Full`] then validates its data and appends the
//! destination and flavor specific stages:
//!
//! 5. `hierarchies`, `backlinks` (HTML, links converted)
//! 6. `hover-preview` (hover flavors)
//! 7. `publish`
//! 8. `math`, `mermaid` (as configured)
//! 9. a second `publish` rewriting note URLs under `/notes/`
//!    (publishing flavor)
//!
//! [`build_rendering_pipeline`] adds the rendering-tree stages on top.

use noteproc_ast::Node;

use crate::Result;
use crate::config::ProcConfig;
use crate::context::{ProcContext, ProcDataInput, RequiredField, missing_fields};
use crate::engine::frontmatter_variables;
use crate::error::ProcError;
use crate::options::{Destination, ProcFlavor, ProcMode, ProcOptions};
use crate::pipeline::{Compiler, Pipeline};
use crate::stage::Stage;
use crate::stages::{
    Abbreviations, AutolinkHeadings, Backlinks, BacklinksHover, BlockAnchors, ExtendedImage,
    Footnotes, Frontmatter, Hashtags, Hierarchies, HoverPreview, Katex, ListFormat, Math, Mermaid,
    NoteRefs, Prism, Publish, Raw, Slug, ToHast, UserTags, Variables, WikiLinks,
};

const FULL_REQUIRED: [RequiredField; 4] = [
    RequiredField::Vault,
    RequiredField::Engine,
    RequiredField::Fname,
    RequiredField::Dest,
];

const IMPORT_REQUIRED: [RequiredField; 3] =
    [RequiredField::Vault, RequiredField::Engine, RequiredField::Dest];

/// Build a pipeline for `options` from partial `data`.
///
/// A markdown serializer is attached unless `options.parse_only` is set.
///
/// # Errors
///
/// [`ProcError::Configuration`] when a mode's required fields are missing.
/// Nothing is built in that case.
pub fn build(options: ProcOptions, data: ProcDataInput) -> Result<Pipeline> {
    let flavor = options.flavor();
    let parse_only = options.parse_only;
    let converts_links = data.converts_links();
    let mut ctx = ProcContext::new(options);
    let mut stages = base_stages(data.dest, converts_links);

    match options.mode {
        ProcMode::NoData => ctx.dest = data.dest,
        ProcMode::Full => {
            let missing = missing_fields(&FULL_REQUIRED, &data);
            if !missing.is_empty() {
                return Err(ProcError::missing_fields(missing));
            }
            let mut data = data;
            if data.fm.is_none()
                && let (Some(engine), Some(vault), Some(fname)) =
                    (&data.engine, &data.vault, &data.fname)
                && let Some(note) = engine.find_note_by_fname(fname, vault)
            {
                data.fm = Some(frontmatter_variables(&note));
            }
            ctx.merge(data);

            if ctx.dest == Some(Destination::Html) && converts_links {
                stages.push(Box::new(Hierarchies));
                stages.push(Box::new(Backlinks));
            }
            if matches!(
                flavor,
                ProcFlavor::HoverPreview | ProcFlavor::BacklinksPanelHover
            ) {
                stages.push(Box::new(HoverPreview));
            }

            let publishing = ctx.should_apply_publishing_rules();
            let title = insert_title(ctx.inside_note_ref, flavor, &ctx.config, publishing);
            stages.push(Box::new(Publish {
                insert_title: ctx.publish.insert_title.unwrap_or(title),
                transform_no_publish: ctx
                    .publish
                    .transform_no_publish
                    .unwrap_or(flavor == ProcFlavor::Publishing),
                link_prefix: ctx.publish.link_prefix.clone(),
                expand_note_refs: true,
            }));

            stages.extend(notation_stages(&ctx.config, publishing));
            if flavor == ProcFlavor::Publishing {
                stages.push(Box::new(Publish::with_link_prefix(notes_prefix(&ctx.config))));
            }
        }
        ProcMode::Import => {
            let missing = missing_fields(&IMPORT_REQUIRED, &data);
            if !missing.is_empty() {
                return Err(ProcError::missing_fields(missing));
            }
            ctx.merge(data);
            let publishing = ctx.should_apply_publishing_rules();
            stages.extend(notation_stages(&ctx.config, publishing));
        }
    }

    let mut pipeline = Pipeline::new(ctx);
    for stage in stages {
        pipeline.push(stage);
    }
    if !parse_only {
        pipeline.set_compiler(Some(Compiler::Markdown));
    }
    tracing::debug!(
        mode = options.mode.as_str(),
        flavor = flavor.as_str(),
        stages = ?pipeline.stage_names(),
        "Built pipeline"
    );
    Ok(pipeline)
}

/// The stages every pipeline starts with.
fn base_stages(dest: Option<Destination>, converts_links: bool) -> Vec<Box<dyn Stage>> {
    let mut stages: Vec<Box<dyn Stage>> = vec![
        Box::new(Frontmatter),
        Box::new(Abbreviations),
        Box::new(ListFormat),
    ];
    if dest.is_some_and(|d| d.is_tree_only()) {
        stages.push(Box::new(NoteRefs));
    }
    stages.extend([
        Box::new(BlockAnchors) as Box<dyn Stage>,
        Box::new(Hashtags),
        Box::new(UserTags),
        Box::new(ExtendedImage),
        Box::new(Footnotes),
        Box::new(Variables),
        Box::new(BacklinksHover),
    ]);
    if converts_links {
        stages.push(Box::new(WikiLinks));
    }
    stages
}

fn notation_stages(config: &ProcConfig, publishing: bool) -> Vec<Box<dyn Stage>> {
    let mut stages: Vec<Box<dyn Stage>> = Vec::new();
    if config.enable_katex(publishing) {
        stages.push(Box::new(Math));
    }
    if config.enable_mermaid(publishing) {
        stages.push(Box::new(Mermaid));
    }
    stages
}

/// URL prefix of published note pages.
fn notes_prefix(config: &ProcConfig) -> String {
    match config.assets_prefix() {
        Some(prefix) => format!("{prefix}/notes/"),
        None => "/notes/".to_string(),
    }
}

/// Whether the publishing transform should insert the note title.
///
/// Never inside a note reference or for backlink panel hovers; otherwise
/// the frontmatter title toggle of the applicable configuration section
/// decides.
pub fn insert_title(
    inside_note_ref: bool,
    flavor: ProcFlavor,
    config: &ProcConfig,
    publishing_rules: bool,
) -> bool {
    if inside_note_ref || flavor == ProcFlavor::BacklinksPanelHover {
        return false;
    }
    config.enable_fm_title(publishing_rules)
}

/// [`build`] without a serializer.
pub fn build_parsing_pipeline(options: ProcOptions, data: ProcDataInput) -> Result<Pipeline> {
    build(options.with_parse_only(true), data)
}

/// A pipeline producing HTML.
///
/// The destination is forced to [`Destination::Html`]. After the stages of
/// [`build`] come `to-hast`, `prism`, `raw` and `slug`, then `katex` when
/// math is enabled and `autolink-headings` when publishing rules apply. An
/// HTML serializer is attached unless `options.parse_only` is set.
pub fn build_rendering_pipeline(options: ProcOptions, data: ProcDataInput) -> Result<Pipeline> {
    let parse_only = options.parse_only;
    let mut pipeline = build_parsing_pipeline(options, data.with_dest(Destination::Html))?;

    pipeline.push(Box::new(ToHast));
    pipeline.push(Box::new(Prism));
    pipeline.push(Box::new(Raw));
    pipeline.push(Box::new(Slug));

    let publishing = pipeline.context().should_apply_publishing_rules();
    if pipeline.context().config.enable_katex(publishing) {
        pipeline.push(Box::new(Katex));
    }
    if publishing {
        pipeline.push(Box::new(AutolinkHeadings));
    }
    if !parse_only {
        pipeline.set_compiler(Some(Compiler::Html));
    }
    tracing::debug!(stages = ?pipeline.stage_names(), "Built rendering pipeline");
    Ok(pipeline)
}

/// [`build`] with the mode and flavor given by name.
///
/// # Errors
///
/// [`ProcError::ContractViolation`] for an unknown mode or flavor name.
pub fn build_named(
    mode: &str,
    flavor: Option<&str>,
    parse_only: bool,
    data: ProcDataInput,
) -> Result<Pipeline> {
    let options = ProcOptions::from_names(mode, flavor)?.with_parse_only(parse_only);
    build(options, data)
}

/// Full-mode pipeline with a markdown serializer.
pub fn full_pipeline(data: ProcDataInput, flavor: ProcFlavor) -> Result<Pipeline> {
    build(ProcOptions::new(ProcMode::Full).with_flavor(flavor), data)
}

/// Full-mode parse-only pipeline.
pub fn parse_full(data: ProcDataInput) -> Result<Pipeline> {
    build_parsing_pipeline(ProcOptions::new(ProcMode::Full), data)
}

/// Import-mode parse-only pipeline.
pub fn parse_import(data: ProcDataInput) -> Result<Pipeline> {
    build_parsing_pipeline(ProcOptions::new(ProcMode::Import), data)
}

/// Parse-only pipeline that needs no data besides the destination.
pub fn parse_no_data(dest: Destination, flavor: ProcFlavor) -> Pipeline {
    let options = ProcOptions::new(ProcMode::NoData)
        .with_flavor(flavor)
        .with_parse_only(true);
    let mut ctx = ProcContext::new(options);
    ctx.dest = Some(dest);
    let mut pipeline = Pipeline::new(ctx);
    for stage in base_stages(Some(dest), true) {
        pipeline.push(stage);
    }
    pipeline
}

/// Full-mode HTML pipeline.
pub fn render_full(data: ProcDataInput, flavor: ProcFlavor) -> Result<Pipeline> {
    build_rendering_pipeline(ProcOptions::new(ProcMode::Full).with_flavor(flavor), data)
}

/// Rendering pipeline without a serializer; the result is a rendering tree.
pub fn parse_for_html(options: ProcOptions, data: ProcDataInput) -> Result<Pipeline> {
    build_rendering_pipeline(options.with_parse_only(true), data)
}

/// Parse `source` with a no-data pipeline for `dest` and return the tree.
pub fn parse_tree(source: &str, dest: Destination) -> Result<Node> {
    parse_no_data(dest, ProcFlavor::Regular).process(source)
}

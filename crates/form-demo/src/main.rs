//! Headless driver for the form engine.
//!
//! Loads a form property bag, applies `id=value` edits from the command line
//! the way a widget layer would, then prints the visible rows of each section
//! and the submission JSON.
//!
//! ```text
//! form-demo [--form=PATH] [--encode] hasPet=true petName=Rex species=dog sizeLarge=on
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use rune_config::RuneConfig;
use rune_form::{FieldKind, Form, FormEvent, FormObserver, Row, value::parse_flag};

const BUNDLED_FORM: &str = include_str!("../../rune-form/forms/pet_profile.json");

/// Logs every form event at debug level.
struct EventLog;

impl FormObserver for EventLog {
    fn on_form_event(&mut self, event: &FormEvent) {
        log::debug!("form event: {event:?}");
    }
}

fn load_form(config: &RuneConfig) -> Result<Form> {
    match &config.demo.form_path {
        Some(path) => Form::from_path(path, config.form.clone())
            .with_context(|| format!("failed to load form from {}", path.display())),
        None => {
            let json: serde_json::Value = serde_json::from_str(BUNDLED_FORM)?;
            Ok(Form::decode_with_config(&json, config.form.clone())?)
        }
    }
}

/// Routes one `id=value` edit to the operation matching the field's kind.
fn apply_edit(form: &mut Form, edit: &str) -> Result<()> {
    let Some((id, value)) = edit.split_once('=') else {
        bail!("expected `id=value`, got `{edit}`");
    };
    let kind = form
        .field(id)
        .map(|field| field.kind())
        .with_context(|| format!("unknown field `{id}`"))?;

    let settled = match kind {
        FieldKind::Radio => {
            let checked = parse_flag(value).with_context(|| format!("`{value}` is not a flag"))?;
            form.set_checked(id, checked)?
        }
        FieldKind::Picker if !form.options(id)?.is_empty() => form.select_option(id, value)?,
        _ => form.commit_input(id, value)?,
    };
    log::info!(
        "{id} <- {value:?} (epoch {}, {} passes{})",
        settled.epoch,
        settled.passes,
        if settled.structure_changed { ", rows changed" } else { "" }
    );
    Ok(())
}

fn print_rows(form: &Form) {
    for (index, section) in form.sections().iter().enumerate() {
        let rows = form.fields_in_section(index);
        if rows.is_empty() {
            continue;
        }
        let header = if section.header().is_empty() {
            format!("section {index}")
        } else {
            section.header().to_string()
        };
        println!("== {header} ==");
        for row in rows {
            match row {
                Row::Separator => println!("  ----"),
                Row::Field(field) => {
                    let title = field.display().title.as_deref().unwrap_or(field.id());
                    let state = if field.is_enabled() { "" } else { " (disabled)" };
                    println!("  {title} [{}]: {}{state}", field.kind(), field.value());
                }
            }
        }
        if !section.footer().is_empty() {
            println!("  {}", section.footer());
        }
    }
}

fn main() -> Result<()> {
    let mut config = RuneConfig::load();
    let mut encode = false;
    let mut edits = Vec::new();
    for arg in std::env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--form=") {
            config.demo.form_path = Some(path.into());
        } else if arg == "--encode" {
            encode = true;
        } else {
            edits.push(arg);
        }
    }

    let filter = config.logging.filter.clone().unwrap_or_else(|| "info".to_string());
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).try_init();

    let mut form = load_form(&config)?;
    form.subscribe(Rc::new(RefCell::new(EventLog)));
    log::info!(
        "loaded form {:?} with {} fields in {} sections",
        form.name().unwrap_or("untitled"),
        form.field_count(),
        form.section_count()
    );

    for edit in &edits {
        apply_edit(&mut form, edit)?;
    }

    print_rows(&form);
    println!("visible rows: {}", form.visible_row_count());
    println!("submission: {}", serde_json::to_string_pretty(&form.submission())?);
    if encode {
        println!("{}", form.to_json_string_pretty()?);
    }
    Ok(())
}

//! Interactive rule editing
//!
//! Selectable keys with catalog values get a closed choice list; every
//! other key gets a free-text prompt.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use ruledesk_core::domain::{EntrySchema, ACTION_SCHEMA, CONDITION_SCHEMA};
use ruledesk_core::services::RuleEditor;
use ruledesk_core::{ChoiceCatalog, MatchMode};

/// Whether prompting is possible
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Walk through the rule fields
///
/// Every existing condition and action is edited in order, then new rows
/// are offered until the user declines.
pub fn edit_rule(editor: &mut RuleEditor) -> Result<()> {
    let description: String = Input::new()
        .with_prompt("Description")
        .default(editor.rule().description.clone())
        .interact_text()?;
    editor.set_description(description);

    let modes: Vec<&str> = MatchMode::ALL_MODES.iter().map(|m| m.title()).collect();
    let current = MatchMode::ALL_MODES
        .iter()
        .position(|m| *m == editor.rule().match_mode)
        .unwrap_or(0);
    let selected = Select::new()
        .with_prompt("Match")
        .items(&modes)
        .default(current)
        .interact()?;
    editor.set_match(MatchMode::ALL_MODES[selected]);

    for index in 0..editor.rule().conditions().len() {
        edit_condition(editor, index)?;
    }
    while confirm("Add another condition?")? {
        editor.add_condition();
        let index = editor.rule().conditions().len() - 1;
        edit_condition(editor, index)?;
    }

    for index in 0..editor.rule().actions().len() {
        edit_action(editor, index)?;
    }
    while confirm("Add another action?")? {
        editor.add_action();
        let index = editor.rule().actions().len() - 1;
        edit_action(editor, index)?;
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

fn edit_condition(editor: &mut RuleEditor, index: usize) -> Result<()> {
    let catalog = editor.catalogs().conditions.clone();
    let current = editor.rule().conditions()[index].key().to_string();
    let prompt = format!("Condition {}", index + 1);
    let key = pick_key(&prompt, &CONDITION_SCHEMA, &catalog, &current)?;
    editor.set_condition_key(index, &key)?;

    let entry = &editor.rule().conditions()[index];
    let value = pick_value(
        &format!("{} =", key),
        entry.is_selectable(),
        entry.value_choices(),
        &entry.value,
    )?;
    editor.set_condition_value(index, value)?;
    Ok(())
}

fn edit_action(editor: &mut RuleEditor, index: usize) -> Result<()> {
    let catalog = editor.catalogs().actions.clone();
    let current = editor.rule().actions()[index].key().to_string();
    let prompt = format!("Action {}", index + 1);
    let key = pick_key(&prompt, &ACTION_SCHEMA, &catalog, &current)?;
    editor.set_action_key(index, &key)?;

    let entry = &editor.rule().actions()[index];
    let value = pick_value(
        &entry.title,
        entry.is_selectable(),
        entry.value_choices(),
        &entry.value,
    )?;
    editor.set_action_value(index, value)?;
    Ok(())
}

/// Keys offered for an entry type: the schema's titled keys, then any
/// extra keys the catalog knows about
pub fn key_options(schema: &EntrySchema, catalog: &ChoiceCatalog) -> Vec<(String, String)> {
    let mut options: Vec<(String, String)> = schema
        .key_choices
        .iter()
        .map(|choice| (choice.key.to_string(), choice.title.to_string()))
        .collect();
    for key in catalog.keys() {
        if schema.title_for(key).is_none() {
            options.push((key.to_string(), key.to_string()));
        }
    }
    options
}

fn pick_key(
    prompt: &str,
    schema: &EntrySchema,
    catalog: &ChoiceCatalog,
    current: &str,
) -> Result<String> {
    let options = key_options(schema, catalog);
    let labels: Vec<&str> = options.iter().map(|(_, title)| title.as_str()).collect();
    let default = options.iter().position(|(key, _)| key == current).unwrap_or(0);

    let selected = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(options[selected].0.clone())
}

fn pick_value(prompt: &str, selectable: bool, choices: &[String], current: &str) -> Result<String> {
    if selectable && !choices.is_empty() {
        let default = choices.iter().position(|c| c == current).unwrap_or(0);
        let selected = Select::new()
            .with_prompt(prompt)
            .items(choices)
            .default(default)
            .interact()?;
        return Ok(choices[selected].clone());
    }

    let value: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

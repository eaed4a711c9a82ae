use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use postwoman_cli_utils::{parse_header, print_result};
use postwoman_lib::{Method, RequestDraft, RequestRunner};

use crate::{flush, watch_state};

/// Edit the draft, send it, show the response; repeat until the user stops.
/// Runs never overlap here: the next prompt waits for the previous result.
pub async fn interactive(runner: &RequestRunner) -> Result<bool> {
    let theme = ColorfulTheme::default();
    let mut draft = RequestDraft::new();

    loop {
        edit_draft(&theme, &mut draft)?;

        let raw = Select::with_theme(&theme)
            .with_prompt("View")
            .items(&["JSON", "RAW"])
            .default(0)
            .interact()?
            == 1;

        let watcher = watch_state(runner.subscribe());
        let result = runner.execute(&draft).await;
        watcher.abort();

        let mut output: Vec<String> = Vec::new();
        print_result(&mut output, &result, raw);
        flush(output)?;

        let again = Confirm::with_theme(&theme)
            .with_prompt("Edit and send again?")
            .default(true)
            .interact()?;
        if !again {
            return Ok(!result.is_error());
        }
    }
}

fn edit_draft(theme: &ColorfulTheme, draft: &mut RequestDraft) -> Result<()> {
    let labels: Vec<&str> = Method::ALL.iter().map(|m| m.as_str()).collect();
    let current = Method::ALL
        .iter()
        .position(|m| *m == draft.method)
        .unwrap_or_default();
    let idx = Select::with_theme(theme)
        .with_prompt("Method")
        .items(&labels)
        .default(current)
        .interact()?;
    draft.method = Method::ALL[idx];

    draft.url = Input::with_theme(theme)
        .with_prompt("Url")
        .with_initial_text(draft.url.clone())
        .validate_with(|s: &String| RequestDraft::check_url(s))
        .interact_text()?;

    edit_headers(theme, draft)?;

    if draft.method.has_body() {
        draft.body_text = Input::with_theme(theme)
            .with_prompt("Body (JSON)")
            .with_initial_text(draft.body_text.clone())
            .allow_empty(true)
            .interact_text()?;
    } else {
        println!("GET and DELETE requests are sent without a body.");
    }

    Ok(())
}

/// Existing rows can be changed or cleared (empty input removes the row);
/// new rows are read until an empty line.
fn edit_headers(theme: &ColorfulTheme, draft: &mut RequestDraft) -> Result<()> {
    let mut idx = 0;
    while idx < draft.headers.len() {
        let entry = &draft.headers[idx];
        let initial = match entry.key.is_empty() && entry.value.is_empty() {
            true => String::new(),
            false => format!("{}: {}", entry.key, entry.value),
        };
        let line = read_header_line(theme, &format!("Header #{}", idx + 1), initial)?;
        if line.trim().is_empty() {
            draft.remove_header(idx);
            continue;
        }
        let entry = parse_header(&line)?;
        draft.set_header_key(idx, entry.key);
        draft.set_header_value(idx, entry.value);
        idx += 1;
    }

    loop {
        let line = read_header_line(theme, "New header (key: value, empty to finish)", String::new())?;
        if line.trim().is_empty() {
            return Ok(());
        }
        let entry = parse_header(&line)?;
        draft.add_header();
        let last = draft.headers.len() - 1;
        draft.set_header_key(last, entry.key);
        draft.set_header_value(last, entry.value);
    }
}

fn read_header_line(theme: &ColorfulTheme, prompt: &str, initial: String) -> Result<String> {
    let line: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .validate_with(|s: &String| -> Result<(), String> {
            match s.trim().is_empty() {
                true => Ok(()),
                false => parse_header(s).map(|_| ()).map_err(|e| e.to_string()),
            }
        })
        .interact_text()?;
    Ok(line)
}

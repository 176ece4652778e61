use std::path::Path;
use std::thread;

use colored::Colorize;
use crossbeam_channel::{select, unbounded};
use keysticks_control::InputControl;
use keysticks_profile::{
    load_profile, AxisKey, ProfileEvent, ProfileWatcher, Source, StateVector,
};

use crate::cli::Command;
use crate::error::{CliError, Result};
use crate::{print_debug, print_error, print_info, print_warning};

pub(crate) fn run(command: Command) -> Result<()> {
    match command {
        Command::Check { profile } => {
            let mut source = load_profile(&profile)?;
            print_lines(&check(&mut source));
        }
        Command::Resolve {
            profile,
            situation,
            control,
            exact,
        } => {
            let source = load_profile(&profile)?;
            print_lines(&resolve(&source, &situation, &control, exact)?);
        }
        Command::Table {
            profile,
            situation,
            exact,
        } => {
            let source = load_profile(&profile)?;
            print_lines(&table(&source, &situation, exact)?);
        }
        Command::Grid {
            profile,
            mode,
            situation,
        } => {
            let source = load_profile(&profile)?;
            print_lines(&grid(&source, mode, situation)?);
        }
        Command::Watch { profile } => watch(&profile)?,
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        print_info!("{line}");
    }
}

fn ensure_situation(source: &Source, situation: &StateVector) -> Result<()> {
    if source.tree().has_state(situation) {
        Ok(())
    } else {
        Err(CliError::UnknownSituation(*situation))
    }
}

/// Validates the source in place and describes what was dropped.
fn check(source: &mut Source) -> Vec<String> {
    let report = source.validate();
    let security = source.validate_security();
    let mut lines = Vec::new();

    for mode in &report.removed_modes {
        lines.push(format!("removed mode {mode}: its controls are not in the layout"));
    }
    for (state, control) in report.actions.removed.iter().chain(&security.removed) {
        lines.push(format!("removed actions for {control} at {state}"));
    }
    let changed = report.actions.changed + security.changed;
    if changed > 0 {
        lines.push(format!("trimmed {changed} action sets"));
    }

    let grids = source
        .tree()
        .modes()
        .iter()
        .filter(|mode| mode.grid.is_some())
        .count();
    lines.push(format!(
        "{}: {} modes ({grids} with grids), {} action sets",
        if source.name().is_empty() { "profile" } else { source.name() },
        source.tree().mode_ids().count(),
        source.store().len(),
    ));
    lines
}

fn resolve(
    source: &Source,
    situation: &StateVector,
    control: &InputControl,
    exact: bool,
) -> Result<Vec<String>> {
    ensure_situation(source, situation)?;
    let mode = source.get_active_direction_mode(situation, control);
    let mut lines = vec![format!("{control} at {situation} ({mode})")];

    match source.get_actions_for_input_control(situation, control, !exact) {
        Some(set) => {
            lines.push(format!("bound at {}", set.logical_state()));
            lines.extend(set.lists().iter().map(|list| format!("  {list}")));
        }
        None => lines.push("no actions".to_string()),
    }
    Ok(lines)
}

fn table(source: &Source, situation: &StateVector, exact: bool) -> Result<Vec<String>> {
    ensure_situation(source, situation)?;
    let table = source.get_actions_for_state(situation, !exact);
    let mut entries: Vec<_> = table.iter().collect();
    entries.sort_by_key(|(control, _)| **control);

    let mut lines = vec![format!("{} controls bound at {situation}", entries.len())];
    for (control, set) in entries {
        lines.push(format!("{control} (from {})", set.logical_state()));
        lines.extend(set.lists().iter().map(|list| format!("  {list}")));
    }
    Ok(lines)
}

fn grid(source: &Source, mode: u32, situation: Option<StateVector>) -> Result<Vec<String>> {
    let index = source
        .get_grid_bindings(AxisKey::Id(mode))
        .ok_or(CliError::NoGrid(mode))?;
    let current = match situation {
        Some(situation) => {
            ensure_situation(source, &situation)?;
            situation
        }
        None => source.tree().make_specific(&StateVector::of_mode(mode)),
    };

    let mut lines = vec![format!(
        "{} slots in mode {mode}, resolved at {current}",
        index.slot_count()
    )];
    for slot in 0..index.slot_count() {
        let name = index.slot_name(slot).unwrap_or_default();
        for binding in index.bindings_for_slot(slot) {
            let target = source.relative_state_to_absolute(&binding.state, &current);
            lines.push(format!("{slot:>3} {name}: {} -> {target}", binding.control));
        }
    }
    Ok(lines)
}

fn watch(path: &Path) -> Result<()> {
    let (stop_tx, stop_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    let (_watcher, events_std_rx) = ProfileWatcher::new_with_starting_event(path)?;
    let (events_tx, events_rx) = unbounded::<ProfileEvent>();
    thread::spawn(move || {
        while let Ok(event) = events_std_rx.recv() {
            let _ = events_tx.send(event);
        }
    });

    print_info!("watching {}", path.display());
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(events_rx) -> msg => match msg {
                Ok(ProfileEvent::Changed(mut source)) => {
                    print_debug!("profile changed");
                    print_lines(&check(&mut source));
                }
                Ok(ProfileEvent::Removed) => {
                    print_warning!("{} was removed", path.display());
                }
                Ok(ProfileEvent::Error(e)) => {
                    print_error!("{e}");
                }
                Err(_) => break,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use keysticks_profile::parse_profile;

    use super::*;

    fn sample() -> Source {
        parse_profile(include_str!("../../../keysticks_profile.yaml")).expect("profile")
    }

    fn state(s: &str) -> StateVector {
        s.parse().expect("valid state")
    }

    #[test]
    fn check_keeps_a_valid_profile() {
        let mut source = sample();
        let before = source.store().len();
        let lines = check(&mut source);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Everyday:"));
        assert_eq!(source.store().len(), before);
    }

    #[test]
    fn check_reports_removed_actions() {
        let mut source = parse_profile(
            r#"
version: 1
modes: [ { id: 1, name: Game } ]
actions:
  - situation: "1,*,*"
    control: trigger1
    on:
      moved: [ { action: control_the_pointer } ]
"#,
        )
        .expect("profile");
        let lines = check(&mut source);
        assert!(lines.iter().any(|line| line.contains("trigger1")));
        assert!(source.store().is_empty());
    }

    #[test]
    fn resolve_walks_up_to_the_root() {
        let source = sample();
        let control = InputControl::button(10);
        let lines = resolve(&source, &state("3,2,1"), &control, false).expect("lines");
        assert_eq!(lines[1], "bound at *,*,*");

        let exact = resolve(&source, &state("3,2,1"), &control, true).expect("lines");
        assert_eq!(exact[1], "no actions");
    }

    #[test]
    fn resolve_rejects_unknown_situation() {
        let source = sample();
        let result = resolve(&source, &state("9,*,*"), &InputControl::button(1), false);
        assert!(matches!(result, Err(CliError::UnknownSituation(_))));
    }

    #[test]
    fn table_lists_controls_in_order() {
        let source = sample();
        let lines = table(&source, &state("3,2,1"), false).expect("lines");
        assert!(lines[0].ends_with("bound at 3,2,1"));
        assert!(lines.iter().any(|line| line == "button1 (from 3,2,1)"));
    }

    #[test]
    fn grid_needs_a_grid_mode() {
        let source = sample();
        assert!(matches!(grid(&source, 1, None), Err(CliError::NoGrid(1))));

        let lines = grid(&source, 3, None).expect("lines");
        assert!(lines[0].starts_with("5 slots in mode 3"));
        assert_eq!(lines.len(), 6);
    }
}

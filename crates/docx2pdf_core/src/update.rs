use crate::{AppState, ConverterAvailability, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AppStarted => {
            // Default directory first so it lands before any converter result.
            vec![
                Effect::ResolveDefaultOutputDir,
                Effect::CheckConverter,
                Effect::CheckForUpdates,
            ]
        }
        Msg::AvailabilityChecked(found) => {
            state.set_availability(if found {
                ConverterAvailability::Available
            } else {
                ConverterAvailability::Missing
            });
            Vec::new()
        }
        Msg::RetryAvailabilityClicked => {
            if state.availability() == ConverterAvailability::Missing {
                state.set_availability(ConverterAvailability::Unknown);
                vec![Effect::CheckConverter]
            } else {
                Vec::new()
            }
        }
        Msg::FilesAdded(paths) => {
            if queue_unlocked(&state) {
                state.add_files(paths);
            }
            Vec::new()
        }
        Msg::RemoveClicked { index } => {
            if queue_unlocked(&state) {
                state.remove_at(index);
            }
            Vec::new()
        }
        Msg::ClearCompletedClicked => {
            if queue_unlocked(&state) {
                state.clear_completed();
            }
            Vec::new()
        }
        Msg::OutputDirResolved(dir) | Msg::OutputDirSelected(dir) => {
            if !state.is_converting() {
                state.set_output_dir(Some(dir));
            }
            Vec::new()
        }
        Msg::OutputDirCleared => {
            if !state.is_converting() {
                state.set_output_dir(None);
            }
            Vec::new()
        }
        Msg::ConvertClicked => {
            if !queue_unlocked(&state) || state.is_converting() || state.entries().is_empty() {
                return (state, Vec::new());
            }
            let output_dir = state.output_dir().map(ToOwned::to_owned);
            let (run_id, files) = state.begin_run();
            vec![Effect::ConvertBatch {
                run_id,
                files,
                output_dir,
            }]
        }
        Msg::Progress(event) => {
            state.apply_progress(&event);
            Vec::new()
        }
        Msg::BatchFinished { run_id } => {
            state.finish_run(run_id);
            Vec::new()
        }
        Msg::BatchFailed { run_id, message } => {
            state.fail_run(run_id, message);
            Vec::new()
        }
        Msg::OpenOutputClicked { index } => match state.completed_output(index) {
            Some(path) => vec![Effect::OpenPdf {
                path: path.to_string(),
            }],
            None => Vec::new(),
        },
        Msg::UpdateChecked(version) => {
            state.set_available_update(version);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Queue edits wait until the converter is known to be installed.
fn queue_unlocked(state: &AppState) -> bool {
    state.availability() == ConverterAvailability::Available
}

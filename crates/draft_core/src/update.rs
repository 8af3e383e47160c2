use crate::extract::{extract_title, UNTITLED};
use crate::model::PublishOutcome;
use crate::validate::validate;
use crate::{Effect, Msg, Phase, RunState, Stage};

/// Pure update function: applies a message to the run state and returns the
/// effects the executor must perform next. Messages that do not fit the
/// current phase are ignored.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (
            Phase::Start,
            Msg::Submitted {
                request,
                credentials,
            },
        ) => match validate(&request, &credentials) {
            Err(err) => {
                state.set_phase(Phase::Failed {
                    stage: Stage::Validation,
                });
                vec![Effect::Reject(err)]
            }
            Ok(()) => {
                let conversion = request.conversion_request();
                let cover_image_url = request.cover_image_url().map(ToOwned::to_owned);
                state.accept_request(request.markdown, cover_image_url);
                state.set_phase(Phase::Converting);
                vec![Effect::Convert(conversion)]
            }
        },
        (Phase::Converting, Msg::Converted(conversion)) => {
            // Title comes from the source Markdown, not the rendered HTML.
            let title = extract_title(state.markdown()).unwrap_or_else(|| UNTITLED.to_string());
            state.record_conversion(title, conversion);
            match state.cover_image_url().map(ToOwned::to_owned) {
                Some(image_url) => {
                    state.set_phase(Phase::UploadingCover);
                    vec![Effect::UploadCover { image_url }]
                }
                None => start_publishing(&mut state),
            }
        }
        (Phase::UploadingCover, Msg::CoverUploaded(asset)) => {
            state.record_cover(asset);
            start_publishing(&mut state)
        }
        (Phase::Publishing, Msg::DraftCreated(draft)) => match state.conversion() {
            Some(conversion) => {
                let outcome = PublishOutcome::new(draft, conversion);
                state.set_phase(Phase::Done);
                vec![Effect::Complete(outcome)]
            }
            None => Vec::new(),
        },
        (phase, Msg::StageFailed(stage)) if phase.active_stage() == Some(stage) => {
            state.set_phase(Phase::Failed { stage });
            vec![Effect::Abort { stage }]
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn start_publishing(state: &mut RunState) -> Vec<Effect> {
    match state.create_draft_effect() {
        Some(effect) => {
            state.set_phase(Phase::Publishing);
            vec![effect]
        }
        None => Vec::new(),
    }
}

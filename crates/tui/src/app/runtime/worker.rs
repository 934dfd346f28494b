use crate::app::error::GenerationError;
use crate::app::runtime::client::StreamClient;
use crate::app::runtime::loader::{read_as_data_payload, read_as_text};
use crate::app::runtime::prompt::assemble_parts;
use crate::app::state::files::GenerationInputs;
use crate::app::state::generation::GenerationEvent;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

// Ok(false) means the consumer went away mid-stream.
fn produce(
    inputs: &GenerationInputs,
    client: &dyn StreamClient,
    sink: &mut impl FnMut(GenerationEvent) -> bool,
) -> Result<bool, GenerationError> {
    client.ensure_configured()?;
    let requirements = read_as_text(&inputs.requirements)?;
    let sequence_diagram = read_as_text(&inputs.sequence_diagram)?;
    let image_data = read_as_data_payload(&inputs.config_image)?;
    let parts = assemble_parts(
        &requirements,
        &sequence_diagram,
        &inputs.config_image.mime_type,
        image_data,
    );
    for chunk in client.stream(&parts)? {
        if !sink(GenerationEvent::Chunk(chunk?)) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Runs one generation cycle to completion, reporting every step to `sink`.
/// Exactly one of `Finished` or `Failed` ends the event sequence unless the
/// sink stops accepting events first.
pub fn run_generation(
    inputs: &GenerationInputs,
    client: &dyn StreamClient,
    mut sink: impl FnMut(GenerationEvent) -> bool,
) {
    match produce(inputs, client, &mut sink) {
        Ok(true) => {
            sink(GenerationEvent::Finished);
        }
        Ok(false) => tracing::debug!("generation receiver dropped; stopping worker"),
        Err(error) => {
            tracing::warn!(%error, "generation failed");
            sink(GenerationEvent::Failed(error));
        }
    }
}

pub fn spawn_generation(
    inputs: GenerationInputs,
    client: Arc<dyn StreamClient>,
) -> Receiver<GenerationEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        run_generation(&inputs, client.as_ref(), |event| tx.send(event).is_ok());
    });
    rx
}

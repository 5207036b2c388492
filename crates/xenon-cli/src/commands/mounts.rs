//! `xenonctl mounts` actions.

use std::io::Write;

use xenon_ipc::{DaemonClient, Transport};
use xenon_mounts::{EditOutcome, MountEditor, MountStore};

use super::write_line;
use crate::cli::MountsAction;
use crate::{AppError, IoStreams};

pub(super) fn execute<T, W, E>(
    action: MountsAction,
    store: &MountStore,
    client: &DaemonClient<T>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<(), AppError>
where
    T: Transport,
    W: Write,
    E: Write,
{
    match action {
        MountsAction::List => store.load().iter().try_for_each(|(name, descriptor)| {
            write_line(io.stdout, format_args!("{name}\t{descriptor}"))
        }),
        MountsAction::Add { name, target } => {
            let descriptor = target
                .into_descriptor()
                .ok_or(AppError::MissingMountTarget)?;
            let outcome = MountEditor::new(store, client).upsert(&name, descriptor)?;
            report(&name, "saved", outcome, io)
        }
        MountsAction::Remove { name } => {
            let outcome = MountEditor::new(store, client).remove(&name)?;
            report(&name, "removed", outcome, io)
        }
    }
}

fn report<W, E>(
    name: &str,
    verb: &str,
    outcome: EditOutcome,
    io: &mut IoStreams<'_, W, E>,
) -> Result<(), AppError>
where
    W: Write,
    E: Write,
{
    match outcome {
        EditOutcome::Synced => write_line(io.stdout, format_args!("mount {name} {verb}")),
        EditOutcome::Unchanged => {
            write_line(io.stderr, format_args!("no mount named {name}; nothing changed"))
        }
        EditOutcome::DaemonOutOfSync { reason } => {
            write_line(io.stdout, format_args!("mount {name} {verb}"))?;
            write_line(
                io.stderr,
                format_args!(
                    "warning: the daemon was not reloaded ({reason}); run `xenonctl reload` once it is running"
                ),
            )
        }
    }
}

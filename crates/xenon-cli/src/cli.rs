//! CLI argument definitions for `xenonctl`.

use clap::{Args, Parser, Subcommand};
use xenon_mounts::{MountDescriptor, PresetKind};

/// Command-line interface for the Xenon daemon and its local configuration.
#[derive(Parser, Debug)]
#[command(
    name = "xenonctl",
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// The operation to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Inspects or edits the persisted mount table.
    Mounts {
        /// The mount table action to perform.
        #[command(subcommand)]
        action: MountsAction,
    },
    /// Lists installed application bundle identifiers.
    Bundles,
    /// Lists iCloud container identifiers.
    IcloudBundles,
    /// Prints the daemon's public key.
    Pubkey,
    /// Asks the daemon to regenerate its keypair.
    RegenerateKeys,
    /// Prints a client connection configuration.
    GenerateConfig,
    /// Submits a scanned pairing code.
    Pair {
        /// The pairing code, including its `XE42~` marker.
        code: String,
    },
    /// Asks the daemon to reload the mount table.
    Reload,
    /// Lists bundled third-party licenses.
    Licenses {
        /// Prints the text of one license instead.
        #[arg(long, value_name = "ID")]
        text: Option<String>,
    },
}

/// Mount table actions.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum MountsAction {
    /// Lists mounts in name order.
    List,
    /// Adds or replaces a mount.
    Add {
        /// Mount name: letters, digits, `.`, `_` or `-`.
        name: String,
        /// What the mount exposes.
        #[command(flatten)]
        target: MountTarget,
    },
    /// Removes a mount.
    Remove {
        /// Mount name.
        name: String,
    },
}

/// Exactly one mount target.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub(crate) struct MountTarget {
    /// Absolute filesystem path.
    #[arg(long)]
    path: Option<String>,
    /// Application bundle identifier.
    #[arg(long)]
    bundle: Option<String>,
    /// iCloud container identifier.
    #[arg(long = "icloud-bundle")]
    icloud_bundle: Option<String>,
    /// Well-known location (photos, localfiles, home, documents).
    #[arg(long)]
    preset: Option<PresetKind>,
}

impl MountTarget {
    /// The descriptor for whichever target was given.
    pub(crate) fn into_descriptor(self) -> Option<MountDescriptor> {
        let Self {
            path,
            bundle,
            icloud_bundle,
            preset,
        } = self;
        path.map(MountDescriptor::Path)
            .or_else(|| bundle.map(MountDescriptor::AppBundle))
            .or_else(|| icloud_bundle.map(MountDescriptor::ICloudBundle))
            .or_else(|| preset.map(MountDescriptor::Preset))
    }
}

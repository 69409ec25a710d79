//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the `Commands` enum.

use clap::{Args, Parser, Subcommand};
use limbform_prompt::{PreferenceField, PreferenceSelection};
use std::path::PathBuf;

/// limbform - prosthetic leg cover designer
#[derive(Parser, Debug)]
#[command(name = "limbform")]
#[command(about = "Design a prosthetic leg cover: preferences to description to 3-D model to manufacturer")]
#[command(long_about = r#"
limbform turns a few style preferences into a written design description,
generates a 3-D model of the cover from it, emails the model link to the
manufacturer and shows where the model can be viewed.

EXAMPLES:
  # Run the whole flow, prompting for preferences
  limbform design --recipient maker@example.com

  # Run the whole flow non-interactively
  limbform design --primary-color Red --design-style Geometric --no-email

  # Show the suggested options for every preference
  limbform design --list-options

  # Run single steps against the saved session
  limbform describe --primary-color "Ocean Blue" --texture-finish Matte
  limbform model
  limbform email --browser
  limbform view --open

  # Show the effective configuration and where each value came from
  limbform config --json

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .limbform/config.toml,
  then $LIMBFORM_HOME/config.toml. Use --config to specify an explicit path.
  API keys are read from the environment variables named in the config
  (LIMBFORM_TEXT_API_KEY, LIMBFORM_MODEL_TOKEN, LIMBFORM_NOTIFY_API_KEY by default).

STEPS:
  Describe → Model → Email / View
  Results are saved to session.json in the state directory so later
  commands can pick up where the previous one stopped.
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding session.json
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Manufacturer email address
    #[arg(long, global = true)]
    pub recipient: Option<String>,

    /// Account the email is sent from
    #[arg(long, global = true)]
    pub sender: Option<String>,

    /// Text-generation model used for descriptions
    #[arg(long, global = true)]
    pub description_model: Option<String>,

    /// Whole-request timeout for remote calls, in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// One flag per preference field. Suggested values are listed by
/// `limbform design --list-options`; any text is accepted.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceArgs {
    /// Main color of the cover
    #[arg(long)]
    pub primary_color: Option<String>,

    /// Secondary color for details
    #[arg(long)]
    pub accent_color: Option<String>,

    /// Overall design style
    #[arg(long)]
    pub design_style: Option<String>,

    /// Surface texture or finish
    #[arg(long)]
    pub texture_finish: Option<String>,

    /// Personal element such as initials or a motif
    #[arg(long)]
    pub personalization: Option<String>,

    /// Material the cover should look like
    #[arg(long)]
    pub material_look: Option<String>,
}

impl PreferenceArgs {
    #[must_use]
    pub fn to_selection(&self) -> PreferenceSelection {
        PreferenceSelection {
            primary_color: self.primary_color.clone(),
            accent_color: self.accent_color.clone(),
            design_style: self.design_style.clone(),
            texture_finish: self.texture_finish.clone(),
            personalization: self.personalization.clone(),
            material_look: self.material_look.clone(),
        }
    }

    /// True when no flag was given at all
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn value(&self, field: PreferenceField) -> Option<&str> {
        match field {
            PreferenceField::PrimaryColor => self.primary_color.as_deref(),
            PreferenceField::AccentColor => self.accent_color.as_deref(),
            PreferenceField::DesignStyle => self.design_style.as_deref(),
            PreferenceField::TextureFinish => self.texture_finish.as_deref(),
            PreferenceField::Personalization => self.personalization.as_deref(),
            PreferenceField::MaterialLook => self.material_look.as_deref(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full flow: describe, model, email, view
    Design {
        #[command(flatten)]
        preferences: PreferenceArgs,

        /// Print the suggested options for every preference and exit
        #[arg(long)]
        list_options: bool,

        /// Skip emailing the manufacturer
        #[arg(long)]
        no_email: bool,

        /// Open authorization links in the system browser
        #[arg(long)]
        browser: bool,

        /// Open the model in the system browser when done
        #[arg(long)]
        open: bool,
    },

    /// Generate a written design description from preferences
    Describe {
        #[command(flatten)]
        preferences: PreferenceArgs,
    },

    /// Generate the 3-D model from a description
    Model {
        /// Description to use instead of the saved one
        #[arg(long)]
        description: Option<String>,
    },

    /// Email the model link to the manufacturer
    Email {
        /// Model URL to send instead of the saved one
        #[arg(long)]
        model_url: Option<String>,

        /// Description to include instead of the saved one
        #[arg(long)]
        description: Option<String>,

        /// Open authorization links in the system browser
        #[arg(long)]
        browser: bool,
    },

    /// Resolve a viewable model URL, falling back when the model cannot load
    View {
        /// Model URL to view instead of the saved one
        #[arg(long)]
        model_url: Option<String>,

        /// Open the resolved URL in the system browser
        #[arg(long)]
        open: bool,
    },

    /// Show the effective configuration with value sources
    Config,
}

impl Commands {
    /// Command name used in log fields
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Design { .. } => "design",
            Self::Describe { .. } => "describe",
            Self::Model { .. } => "model",
            Self::Email { .. } => "email",
            Self::View { .. } => "view",
            Self::Config => "config",
        }
    }
}

//! Main commands enum.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the TTS server and stream its output until Ctrl+C
    Serve {
        /// Model to load (defaults to the configured model)
        #[arg(short, long, env = "TTSDESK_MODEL")]
        model: Option<String>,
    },

    /// Start a server, speak some text, and optionally save the audio
    Say(SayArgs),

    /// List models offered by a running server
    Models,

    /// List speakers of the model loaded in a running server
    Speakers,

    /// List languages of the model loaded in a running server
    Languages,

    /// Check whether a server is answering on the configured port
    Status,

    /// Find Python interpreters and whether they have the TTS package
    Pythons,
}

/// Arguments for `say`.
#[derive(Args, Debug, Clone)]
pub struct SayArgs {
    /// Text to speak
    pub text: String,

    /// Model to load (defaults to the configured model)
    #[arg(short, long, env = "TTSDESK_MODEL")]
    pub model: Option<String>,

    /// Speaker for multi-speaker models
    #[arg(short, long)]
    pub speaker: Option<String>,

    /// Language for multilingual models
    #[arg(short, long)]
    pub language: Option<String>,

    /// Speed multiplier between 0.5 and 2.0
    #[arg(long)]
    pub speed: Option<f32>,

    /// Reference recording to clone the voice from
    #[arg(long = "clone", value_name = "WAV")]
    pub reference: Option<PathBuf>,

    /// Save the audio to the output directory, optionally under FILENAME
    #[arg(long, value_name = "FILENAME")]
    pub save: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::parser::Cli;

    use super::*;

    fn say(args: &[&str]) -> SayArgs {
        let mut argv = vec!["ttsdesk", "say"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Some(Commands::Say(args)) => args,
            _ => panic!("expected say"),
        }
    }

    #[test]
    fn test_say_minimal() {
        let args = say(&["hello there"]);
        assert_eq!(args.text, "hello there");
        assert!(args.save.is_none());
        assert!(args.reference.is_none());
    }

    #[test]
    fn test_say_save_with_and_without_name() {
        assert_eq!(say(&["hi", "--save"]).save, Some(None));
        assert_eq!(
            say(&["hi", "--save", "greeting.wav"]).save,
            Some(Some("greeting.wav".to_string()))
        );
    }

    #[test]
    fn test_say_voice_options() {
        let args = say(&[
            "hi",
            "--model",
            "tts_models/en/vctk/vits",
            "--speaker",
            "p225",
            "--speed",
            "1.5",
            "--clone",
            "/tmp/me.wav",
        ]);
        assert_eq!(args.model.as_deref(), Some("tts_models/en/vctk/vits"));
        assert_eq!(args.speaker.as_deref(), Some("p225"));
        assert_eq!(args.speed, Some(1.5));
        assert_eq!(args.reference, Some(PathBuf::from("/tmp/me.wav")));
    }
}

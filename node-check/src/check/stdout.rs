use std::io::Write;

use termcolor::WriteColor;

use super::Output;

pub(super) enum Stdout {
    ColoredText {
        stdout: termcolor::StandardStream,
        success_color_spec: termcolor::ColorSpec,
        warning_color_spec: termcolor::ColorSpec,
        error_color_spec: termcolor::ColorSpec,
        header_color_spec: termcolor::ColorSpec,
    },

    DefaultText,

    Captured(termcolor::Buffer),
}

impl Stdout {
    pub(super) fn new(output: Output) -> Self {
        match output {
            Output::Stdout if atty::is(atty::Stream::Stdout) => {
                let stdout = termcolor::StandardStream::stdout(termcolor::ColorChoice::Auto);

                let mut success_color_spec = termcolor::ColorSpec::new();
                success_color_spec.set_fg(Some(termcolor::Color::Green));

                let mut warning_color_spec = termcolor::ColorSpec::new();
                warning_color_spec.set_fg(Some(termcolor::Color::Yellow));

                let mut error_color_spec = termcolor::ColorSpec::new();
                error_color_spec.set_fg(Some(termcolor::Color::Red));

                let mut header_color_spec = termcolor::ColorSpec::new();
                header_color_spec
                    .set_fg(Some(termcolor::Color::Blue))
                    .set_bold(true);

                Stdout::ColoredText {
                    stdout,
                    success_color_spec,
                    warning_color_spec,
                    error_color_spec,
                    header_color_spec,
                }
            }
            Output::Stdout => Stdout::DefaultText,
            Output::Captured => Stdout::Captured(termcolor::Buffer::no_color()),
        }
    }

    /// Everything written so far, if output is being captured.
    pub(super) fn captured(&self) -> Option<String> {
        match self {
            Stdout::Captured(buffer) => Some(String::from_utf8_lossy(buffer.as_slice()).into_owned()),
            _ => None,
        }
    }

    pub(super) fn write_plain<F>(&mut self, f: F) -> std::io::Result<()>
    where
        F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
    {
        match self {
            Stdout::ColoredText { stdout, .. } => f(stdout),
            Stdout::DefaultText => f(&mut std::io::stdout()),
            Stdout::Captured(buffer) => f(buffer),
        }
    }

    pub(super) fn write_success<F>(&mut self, f: F) -> std::io::Result<()>
    where
        F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
    {
        match self {
            Stdout::ColoredText {
                stdout,
                success_color_spec,
                ..
            } => write_colored(stdout, success_color_spec, f),
            Stdout::DefaultText => f(&mut std::io::stdout()),
            Stdout::Captured(buffer) => f(buffer),
        }
    }

    pub(super) fn write_warning<F>(&mut self, f: F) -> std::io::Result<()>
    where
        F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
    {
        match self {
            Stdout::ColoredText {
                stdout,
                warning_color_spec,
                ..
            } => write_colored(stdout, warning_color_spec, f),
            Stdout::DefaultText => f(&mut std::io::stdout()),
            Stdout::Captured(buffer) => f(buffer),
        }
    }

    pub(super) fn write_error<F>(&mut self, f: F) -> std::io::Result<()>
    where
        F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
    {
        match self {
            Stdout::ColoredText {
                stdout,
                error_color_spec,
                ..
            } => write_colored(stdout, error_color_spec, f),
            Stdout::DefaultText => f(&mut std::io::stdout()),
            Stdout::Captured(buffer) => f(buffer),
        }
    }

    pub(super) fn write_header<F>(&mut self, f: F) -> std::io::Result<()>
    where
        F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
    {
        match self {
            Stdout::ColoredText {
                stdout,
                header_color_spec,
                ..
            } => write_colored(stdout, header_color_spec, f),
            Stdout::DefaultText => f(&mut std::io::stdout()),
            Stdout::Captured(buffer) => f(buffer),
        }
    }
}

fn write_colored<F>(
    stdout: &mut termcolor::StandardStream,
    spec: &termcolor::ColorSpec,
    f: F,
) -> std::io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    stdout.set_color(spec)?;
    let result = f(stdout);
    stdout.reset()?;
    result
}

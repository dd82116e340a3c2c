use std::fs;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

use crate::cli::{Cli, Command};
use crate::codec::{self, Direction, Scheme};
use crate::container;
use crate::error::Error;
use crate::logger::Logger;
use crate::securemem::MemoryLock;

/// Bound on interactive password retries, for both the confirmation loop on
/// encryption and the wrong-password loop on decryption.
pub const PASSWORD_ATTEMPTS: u32 = 3;

pub fn run(cli: Cli) -> Result<(), Error> {
    let log = Logger::new(cli.debug, cli.verbose);
    if cli.debug {
        for line in format!("{cli:#?}").lines() {
            log.debug(line);
        }
    }

    let source = match &cli.input {
        Some(path) => Source::File(path.clone()),
        None => Source::Stdin,
    };

    // Configuration errors surface before any byte is read.
    if cli.overwrite && matches!(source, Source::Stdin) {
        return Err(Error::InvalidConfig(
            "--overwrite requires a file input, not stdin",
        ));
    }

    match cli.command {
        Command::Encode { encoder, decode } => {
            let direction = if decode {
                Direction::Inverse
            } else {
                Direction::Forward
            };
            encode(&cli, &source, encoder, direction, &log)
        }
        Command::Crypt {
            decrypt,
            dump_header,
        } => {
            let mode = if decrypt {
                CryptMode::Decrypt
            } else {
                CryptMode::Encrypt
            };
            crypt(&cli, &source, mode, dump_header, &log)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CryptMode {
    Encrypt,
    Decrypt,
}

fn encode(
    cli: &Cli,
    source: &Source,
    scheme: Scheme,
    direction: Direction,
    log: &Logger,
) -> Result<(), Error> {
    let data = source.read(log)?;
    let out = codec::transcode(scheme, direction, &data)?;
    let extension = match direction {
        Direction::Forward => scheme.extension(),
        Direction::Inverse => "plain",
    };
    let sink = resolve_sink(cli, source, extension, log)?;
    write_output(&sink, &out, log)
}

fn crypt(
    cli: &Cli,
    source: &Source,
    mode: CryptMode,
    dump_header: bool,
    log: &Logger,
) -> Result<(), Error> {
    if cli.password_stdin && matches!(source, Source::Stdin) {
        return Err(Error::InvalidConfig(
            "--password-stdin cannot be combined with reading data from stdin",
        ));
    }

    let data = source.read(log)?;

    if dump_header {
        let (header, _) = container::split(&data)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(header.dump(&source.name()).as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    let mut passwords = password_source(cli);

    match mode {
        CryptMode::Decrypt => {
            // Header first: framing errors fail before any password is typed.
            let (header, payload) = container::split(&data)?;
            let plaintext = decrypt_with_retries(&header, payload, passwords.as_mut(), log)?;
            let sink = resolve_sink(cli, source, "plain", log)?;
            write_output(&sink, &plaintext, log)
        }
        CryptMode::Encrypt => {
            let password = MemoryLock::new(confirmed_password(passwords.as_mut(), log)?);
            let sealed = container::seal(&data, &password, log)?;
            let sink = resolve_sink(cli, source, "aes", log)?;
            write_output(&sink, &sealed, log)
        }
    }
}

fn decrypt_with_retries(
    header: &crate::format::Header,
    payload: &[u8],
    passwords: &mut dyn PasswordSource,
    log: &Logger,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let mut failed_before = false;
    for attempt in 1..=PASSWORD_ATTEMPTS {
        let password = match passwords.read("Password: ") {
            Ok(password) => MemoryLock::new(password),
            // An exhausted non-interactive password stream after a bad
            // password reports the real cause.
            Err(_) if failed_before => return Err(Error::Authentication),
            Err(err) => return Err(err),
        };
        match container::open_payload(header, payload, &password, log) {
            Ok(plaintext) => return Ok(plaintext),
            Err(Error::Authentication) if attempt < PASSWORD_ATTEMPTS => {
                failed_before = true;
                log.error("invalid tag: wrong password or corrupted file. Try again.");
            }
            Err(err) => return Err(err),
        }
    }
    Err(Error::Authentication)
}

/// Ask for the password twice; a typo here would otherwise lock the data
/// away for good. Decryption asks only once.
fn confirmed_password(
    passwords: &mut dyn PasswordSource,
    log: &Logger,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    for attempt in 1..=PASSWORD_ATTEMPTS {
        let password = passwords.read("Password: ")?;
        let confirm = passwords.read("Confirm password: ")?;
        if password.as_slice() == confirm.as_slice() {
            log.verbose("passwords match");
            return Ok(password);
        }
        if attempt < PASSWORD_ATTEMPTS {
            log.error("passwords don't match! Try again.");
        }
    }
    Err(Error::PasswordMismatch)
}

trait PasswordSource {
    fn read(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>, Error>;
}

/// Interactive prompt on the controlling terminal; nothing is echoed and the
/// password never appears in argv or the environment.
struct TerminalPrompt;

impl PasswordSource for TerminalPrompt {
    fn read(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>, Error> {
        let password = rpassword::prompt_password(prompt)?;
        Ok(Zeroizing::new(password.into_bytes()))
    }
}

/// One password per line on stdin, for scripts and tests.
struct StdinLines;

impl PasswordSource for StdinLines {
    fn read(&mut self, _prompt: &str) -> Result<Zeroizing<Vec<u8>>, Error> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "password stream exhausted",
            )
            .into());
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        Ok(Zeroizing::new(trimmed.as_bytes().to_vec()))
    }
}

fn password_source(cli: &Cli) -> Box<dyn PasswordSource> {
    if cli.password_stdin {
        Box::new(StdinLines)
    } else {
        Box::new(TerminalPrompt)
    }
}

enum Source {
    File(PathBuf),
    Stdin,
}

impl Source {
    fn name(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Stdin => "stdin".to_string(),
        }
    }

    fn read(&self, log: &Logger) -> Result<Vec<u8>, Error> {
        match self {
            Source::File(path) => {
                log.verbose(format!("reading file '{}'", path.display()));
                fs::read(path).map_err(|err| {
                    if err.kind() == io::ErrorKind::NotFound {
                        Error::SourceNotFound(path.clone())
                    } else {
                        Error::Io(err)
                    }
                })
            }
            Source::Stdin => {
                let stdin = io::stdin();
                // A tty on stdin means nothing was piped in.
                if stdin.is_terminal() {
                    return Err(Error::NoInput);
                }
                log.verbose("reading from stdin");
                let mut data = Vec::new();
                stdin.lock().read_to_end(&mut data)?;
                Ok(data)
            }
        }
    }
}

enum Sink {
    Stdout,
    File(PathBuf),
    /// Replace the input file via a temporary neighbor and an atomic rename.
    Replace(PathBuf),
}

fn resolve_sink(cli: &Cli, source: &Source, extension: &str, log: &Logger) -> Result<Sink, Error> {
    if cli.overwrite {
        return match source {
            Source::File(path) => Ok(Sink::Replace(path.clone())),
            Source::Stdin => Err(Error::InvalidConfig(
                "--overwrite requires a file input, not stdin",
            )),
        };
    }
    Ok(match &cli.output {
        None => Sink::Stdout,
        Some(Some(path)) => Sink::File(path.clone()),
        Some(None) => {
            log.verbose("no output name given, generating one");
            Sink::File(PathBuf::from(format!("{}.{extension}", source.name())))
        }
    })
}

fn write_output(sink: &Sink, bytes: &[u8], log: &Logger) -> Result<(), Error> {
    match sink {
        Sink::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            Ok(())
        }
        Sink::File(path) => {
            log.verbose(format!("writing to '{}'", path.display()));
            // A freshly created file must not survive a failed write.
            let mut cleanup = OutputCleanup::new(path, !path.exists());
            fs::write(path, bytes)?;
            cleanup.disarm();
            Ok(())
        }
        Sink::Replace(path) => {
            let parent = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let mut suffix = [0u8; 8];
            OsRng.fill_bytes(&mut suffix);
            let staging = parent.join(format!(".binlock-{}", hex::encode(suffix)));
            log.verbose(format!(
                "overwriting '{}' through '{}'",
                path.display(),
                staging.display()
            ));
            let mut cleanup = OutputCleanup::new(&staging, true);
            fs::write(&staging, bytes)?;
            fs::rename(&staging, path)?;
            cleanup.disarm();
            Ok(())
        }
    }
}

struct OutputCleanup {
    path: PathBuf,
    armed: bool,
}

impl OutputCleanup {
    fn new(path: &Path, armed: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            armed,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for OutputCleanup {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

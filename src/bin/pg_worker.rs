//! Runs embedded `PostgreSQL` lifecycle steps on behalf of a root test runner.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <payload.json>
//! ```
//!
//! The payload is a serialized `WorkerPayload` holding the cluster settings
//! and the environment the cluster expects. When started as root the worker
//! re-executes itself as `nobody` before touching the data directory, since
//! `PostgreSQL` refuses to run as the superuser.

#[cfg(unix)]
mod worker {
    use camino::{Utf8Path, Utf8PathBuf};
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::env;
    use std::ffi::CString;
    use std::io::{self, Read};
    use std::process::{Command, ExitStatus};
    use thiserror::Error;

    const REEXEC_MARKER: &str = "PG_WORKER_REEXEC";
    const TRUSTED_PATH: &str = "/usr/sbin:/usr/bin:/sbin:/bin";
    const UNPRIVILEGED_USER: &str = "nobody";

    pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

    #[derive(Debug, Error)]
    pub(crate) enum WorkerError {
        #[error("invalid arguments: {0}")]
        Usage(String),
        #[error("failed to read payload: {0}")]
        Payload(#[source] BoxError),
        #[error("failed to parse payload: {0}")]
        PayloadFormat(#[source] serde_json::Error),
        #[error("invalid cluster settings: {0}")]
        Settings(String),
        #[error("failed to build runtime: {0}")]
        Runtime(#[source] io::Error),
        #[error("failed to drop privileges: {0}")]
        Privileges(String),
        #[error("postgres {step} failed: {message}")]
        Postgres {
            step: &'static str,
            message: String,
        },
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum Step {
        Setup,
        Start,
        Stop,
    }

    impl Step {
        pub(crate) fn parse(raw: &str) -> Result<Self, WorkerError> {
            match raw {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::Usage(format!(
                    "unknown step '{other}'; expected setup, start or stop"
                ))),
            }
        }

        const fn name(self) -> &'static str {
            match self {
                Self::Setup => "setup",
                Self::Start => "start",
                Self::Stop => "stop",
            }
        }
    }

    /// Quotes `value` for a POSIX shell command line.
    pub(crate) fn shell_quote(value: &str) -> String {
        format!("'{}'", value.replace('\'', r"'\''"))
    }

    pub(crate) fn parse_args(
        args: &[Utf8PathBuf],
    ) -> Result<(Step, &Utf8Path), WorkerError> {
        match args {
            [_, step, payload] => Ok((Step::parse(step.as_str())?, payload.as_path())),
            [_, _, _, extra, ..] => Err(WorkerError::Usage(format!(
                "unexpected extra argument: {extra}"
            ))),
            _ => Err(WorkerError::Usage(
                "expected a step and a payload path".to_owned(),
            )),
        }
    }

    fn collect_args() -> Result<Vec<Utf8PathBuf>, WorkerError> {
        env::args_os()
            .map(|arg| {
                arg.into_string()
                    .map(Utf8PathBuf::from)
                    .map_err(|_| WorkerError::Usage("argument is not valid UTF-8".to_owned()))
            })
            .collect()
    }

    pub(crate) fn main() -> Result<(), BoxError> {
        let args = collect_args()?;
        let (step, payload_path) = parse_args(&args)?;
        if Uid::effective().is_root() && env::var_os(REEXEC_MARKER).is_none() {
            let status = reexec_unprivileged(&args)?;
            std::process::exit(status.code().unwrap_or(1));
        }
        run(step, payload_path).map_err(Into::into)
    }

    fn reexec_unprivileged(args: &[Utf8PathBuf]) -> Result<ExitStatus, WorkerError> {
        let exe = env::current_exe()
            .map_err(WorkerError::Runtime)?
            .into_os_string()
            .into_string()
            .map(Utf8PathBuf::from)
            .map_err(|_| WorkerError::Usage("executable path is not valid UTF-8".to_owned()))?;
        let forwarded = args.iter().skip(1);

        match Command::new("runuser")
            .args(["-u", UNPRIVILEGED_USER, "--"])
            .arg(exe.as_std_path())
            .args(forwarded.clone().map(|arg| arg.as_std_path()))
            .env(REEXEC_MARKER, "1")
            .env("PATH", TRUSTED_PATH)
            .status()
        {
            Ok(status) => Ok(status),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let command = forwarded.fold(
                    format!("{REEXEC_MARKER}=1 exec {}", shell_quote(exe.as_str())),
                    |mut line, arg| {
                        line.push(' ');
                        line.push_str(&shell_quote(arg.as_str()));
                        line
                    },
                );
                Command::new("/bin/su")
                    .args(["-s", "/bin/sh", UNPRIVILEGED_USER, "-c"])
                    .arg(command)
                    .env("PATH", TRUSTED_PATH)
                    .status()
                    .map_err(|err| WorkerError::Privileges(err.to_string()))
            }
            Err(err) => Err(WorkerError::Privileges(err.to_string())),
        }
    }

    fn run(step: Step, payload_path: &Utf8Path) -> Result<(), WorkerError> {
        let payload = load_payload(payload_path)?;
        drop_privileges(UNPRIVILEGED_USER)?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| WorkerError::Settings(err.to_string()))?;
        apply_environment(&payload.environment);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::Runtime)?;
        let failed = |err: postgresql_embedded::Error| WorkerError::Postgres {
            step: step.name(),
            message: err.to_string(),
        };
        let mut postgres = PostgreSQL::new(settings);
        runtime.block_on(async move {
            match step {
                Step::Setup => {
                    postgres.setup().await.map_err(failed)?;
                    start_unless_running(&mut postgres).await.map_err(failed)
                }
                Step::Start => {
                    start_unless_running(&mut postgres).await.map_err(failed)?;
                    // The server must outlive this process; dropping the handle stops it.
                    std::mem::forget(postgres);
                    Ok(())
                }
                Step::Stop => postgres.stop().await.map_err(failed),
            }
        })
    }

    async fn start_unless_running(
        postgres: &mut PostgreSQL,
    ) -> Result<(), postgresql_embedded::Error> {
        if matches!(postgres.status(), Status::Started) {
            return Ok(());
        }
        postgres.start().await
    }

    fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let read = || -> Result<Vec<u8>, BoxError> {
            let (dir, relative) = ambient_dir_and_path(path)?;
            let mut bytes = Vec::new();
            dir.open(relative.as_std_path())?.read_to_end(&mut bytes)?;
            Ok(bytes)
        };
        let bytes = read().map_err(WorkerError::Payload)?;
        serde_json::from_slice(&bytes).map_err(WorkerError::PayloadFormat)
    }

    fn drop_privileges(username: &str) -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }
        let denied = |err: nix::Error| WorkerError::Privileges(err.to_string());
        let user = User::from_name(username)
            .map_err(denied)?
            .ok_or_else(|| WorkerError::Privileges(format!("user '{username}' not found")))?;
        let name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::Privileges(err.to_string()))?;
        initgroups(&name, user.gid).map_err(denied)?;
        setgid(user.gid).map_err(denied)?;
        setuid(user.uid).map_err(denied)?;

        // SAFETY: the worker is single-threaded at this point.
        unsafe {
            env::set_var("HOME", &user.dir);
            env::set_var("USER", &user.name);
            env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: the worker is single-threaded and owns its environment.
            unsafe {
                match value {
                    Some(secret) => env::set_var(key, secret.expose()),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    worker::main()
}

#[cfg(not(unix))]
fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    Err("pg_worker is only supported on Unix".into())
}

use std::process::ExitCode;

use lal::error::{ErrorKind, LalError, credential_guidance};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let code = match lal::run().await {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("lal: {err:#}");
            match err.downcast_ref::<LalError>() {
                Some(lal_err) => {
                    if lal_err.kind() == ErrorKind::MissingCredential {
                        eprintln!("\n{}", credential_guidance());
                    }
                    lal_err.exit_code()
                }
                None => 1,
            }
        }
    };

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

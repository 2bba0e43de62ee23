//! Info command - shows backend and record counts.

use feedback::Service;

use crate::backend::{backend_label, create_backend};
use crate::cli::InfoArgs;
use crate::output::OutputFormat;

/// Run the info command
pub async fn run(args: &InfoArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let service = Service::new(create_backend(&args.backend_config).await?);

    let users = service.list_users().await?.len();
    let feedback = service.count_feedback().await?;
    let backend_str = backend_label(&args.backend_config);

    match format {
        OutputFormat::Human => {
            println!("Backend:     {backend_str}");
            println!("Users:       {users}");
            println!("Feedback:    {feedback}");
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "backend": backend_str,
                "users": users,
                "feedback": feedback,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}

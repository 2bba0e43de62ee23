//! Users command - lists registered accounts.

use serde::Serialize;

use feedback::Service;

use crate::backend::create_backend;
use crate::cli::UsersArgs;
use crate::output::{OutputFormat, print_table};

#[derive(Debug, Serialize)]
struct UserSummary {
    username: String,
    email: String,
    name: String,
    feedback: usize,
}

async fn summarize(service: &Service) -> feedback::Result<Vec<UserSummary>> {
    let mut summaries = Vec::new();
    for user in service.list_users().await? {
        let feedback = service.list_feedback(&user.username).await?.len();
        summaries.push(UserSummary {
            name: user.full_name(),
            username: user.username,
            email: user.email,
            feedback,
        });
    }
    Ok(summaries)
}

/// Run the users command
pub async fn run(args: &UsersArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let service = Service::new(create_backend(&args.backend_config).await?);
    let users = summarize(&service).await?;

    match format {
        OutputFormat::Human => {
            if users.is_empty() {
                println!("No users");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = users
                .iter()
                .map(|u| {
                    vec![
                        u.username.clone(),
                        u.email.clone(),
                        u.name.clone(),
                        u.feedback.to_string(),
                    ]
                })
                .collect();
            print_table(&["USERNAME", "EMAIL", "NAME", "FEEDBACK"], &rows);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&users)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use feedback::{Identity, NewUser, backend::InMemory};

    use super::*;

    #[tokio::test]
    async fn test_summaries_count_feedback() {
        let service = Service::new(Box::new(InMemory::new()));
        for name in ["bob", "alice"] {
            service
                .register(NewUser {
                    username: name.to_string(),
                    password: "secret".to_string(),
                    email: format!("{name}@x.com"),
                    first_name: "First".to_string(),
                    last_name: "Last".to_string(),
                })
                .await
                .unwrap();
        }
        let alice = Identity::authenticated("alice");
        service
            .create_feedback(&alice, "alice", "Hi", "Hello")
            .await
            .unwrap();

        let users = summarize(&service).await.unwrap();
        let counts: Vec<_> = users
            .iter()
            .map(|u| (u.username.as_str(), u.feedback))
            .collect();
        assert_eq!(counts, vec![("alice", 1), ("bob", 0)]);
        assert_eq!(users[0].name, "First Last");
    }
}

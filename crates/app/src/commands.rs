//! Command execution against a workbench.

use courier_application::ports::ProxyTransport;
use courier_application::{ApplicationResult, RequestBuilder, SaveTarget, User, Workbench};
use courier_domain::{Collection, ResponseDescriptor};

use crate::cli::{Command, SendArgs, WorkspaceAction};

/// Runs one command and prints its result.
///
/// # Errors
///
/// Returns the first service error.
pub async fn run<T: ProxyTransport>(
    workbench: &mut Workbench<T>,
    command: Command,
) -> ApplicationResult<()> {
    match command {
        Command::Login {
            token,
            user_id,
            name,
        } => {
            let user = User {
                name,
                ..User::new(user_id)
            };
            workbench.sign_in(&token, user).await?;
            println!(
                "Signed in: {} collections, {} environments",
                workbench.collections().collections().len(),
                workbench.environments().environments().len()
            );
        }
        Command::Logout => {
            workbench.sign_out();
            println!("Signed out");
        }
        Command::Send(args) => send(workbench, args).await?,
        Command::Open { id } => {
            workbench.open(&id).await?;
            let request = workbench.request();
            println!("{} {}", request.method, request.compute_final_url());
            for row in &request.headers {
                println!("{}: {}", row.key, row.value);
            }
            if !request.raw_body.is_empty() {
                println!("\n{}", request.raw_body);
            }
            if let Some(response) = workbench.response() {
                println!();
                print_response(response);
            }
        }
        Command::Collections => {
            workbench.refresh().await?;
            for collection in workbench.collections().visible_collections() {
                print_collection(collection);
            }
        }
        Command::DeleteCollection { id } => {
            workbench.refresh().await?;
            if workbench.collections_mut().delete_collection(&id).await? {
                println!("Deleted {id}");
            } else {
                println!("Cancelled");
            }
        }
        Command::Environments { id } => {
            workbench.refresh().await?;
            match id {
                Some(id) => {
                    for variable in workbench.environments_mut().list_variables(&id).await? {
                        println!("{} = {}", variable.key, variable.value);
                    }
                }
                None => {
                    for env in workbench.environments().environments() {
                        println!("{}\t{}", env.id, env.title);
                    }
                }
            }
        }
        Command::Workspaces { action } => workspaces(workbench, action)?,
    }
    Ok(())
}

async fn send<T: ProxyTransport>(
    workbench: &mut Workbench<T>,
    args: SendArgs,
) -> ApplicationResult<()> {
    let target = match (args.save_to, args.new_collection) {
        (Some(id), _) => Some(SaveTarget::Existing(id)),
        (None, Some(name)) => Some(SaveTarget::New { name }),
        (None, None) => None,
    };

    if args.env.is_some() || target.is_some() {
        workbench.refresh().await?;
    }
    if let Some(env_id) = &args.env {
        workbench.environments_mut().select_environment(env_id).await?;
    }

    let mut builder = RequestBuilder::new(args.method, args.url)
        .with_body(args.body_type, args.body.unwrap_or_default());
    for (key, value) in args.params {
        builder.add_param(key, value);
    }
    for (key, value) in args.headers {
        builder.set_header(&key, value);
    }
    *workbench.request_mut() = builder;

    print_response(workbench.send().await?);

    if let Some(target) = target {
        let saved = workbench.save(target, args.folder.as_deref()).await?;
        println!("\nSaved as {} ({})", saved.name, saved.id);
    }
    Ok(())
}

fn workspaces<T: ProxyTransport>(
    workbench: &mut Workbench<T>,
    action: Option<WorkspaceAction>,
) -> ApplicationResult<()> {
    let collections = workbench.collections_mut();
    match action {
        Some(WorkspaceAction::New { name }) => {
            let workspace = collections.create_workspace(&name)?;
            println!("Created {} ({})", workspace.name, workspace.id);
        }
        Some(WorkspaceAction::Use { id }) => {
            collections.set_active_workspace(&id)?;
            println!("Active workspace: {id}");
        }
        None => {
            let active = collections.active_workspace_id();
            for workspace in collections.workspaces() {
                let marker = if workspace.id == active { "*" } else { " " };
                println!("{marker} {}\t{}", workspace.id, workspace.name);
            }
        }
    }
    Ok(())
}

fn print_collection(collection: &Collection) {
    println!("{}\t{}", collection.id, collection.name);
    for request in &collection.requests {
        println!("  {} {}\t{}", request.method, request.url, request.id);
    }
    for folder in &collection.folders {
        println!("  [{}]", folder.name);
        for request in &folder.apis {
            println!("    {} {}\t{}", request.method, request.url, request.id);
        }
    }
}

fn print_response(response: &ResponseDescriptor) {
    println!("{}  {}", response.status_line(), response.time_display());
    for row in &response.headers {
        println!("{}: {}", row.key, row.value);
    }
    if !response.body.is_empty() {
        println!("\n{}", response.body);
    }
}

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use colored::Colorize;

use cirrus_provider_cfn::{CfnClient, submit_template};

mod asg;

#[derive(Parser)]
#[command(name = "cirrus")]
#[command(about = "Builds an autoscaling service template and submits it as a stack", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the service template as JSON
    Template {
        /// EC2 instance type for the launch configuration
        #[arg(long, default_value = "m3.medium")]
        instance_type: String,
    },
    /// Build the service template and create the stack
    Deploy {
        /// Name for the created stack
        #[arg(long)]
        stack_name: String,

        /// Template parameter value as Key=Value (repeatable)
        #[arg(long = "parameter", short = 'p', value_name = "KEY=VALUE")]
        parameters: Vec<String>,

        /// EC2 instance type for the launch configuration
        #[arg(long, default_value = "m3.medium")]
        instance_type: String,

        /// AWS region (defaults to the ambient configuration)
        #[arg(long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Template { instance_type } => run_template(&instance_type),
        Commands::Deploy {
            stack_name,
            parameters,
            instance_type,
            region,
        } => run_deploy(&stack_name, &parameters, &instance_type, region.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_template(instance_type: &str) -> Result<(), Box<dyn std::error::Error>> {
    let template = asg::service_template(instance_type)?;
    template.check_signal_wiring()?;
    println!("{}", template.to_json()?);
    Ok(())
}

async fn run_deploy(
    stack_name: &str,
    parameters: &[String],
    instance_type: &str,
    region: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let values = parse_parameters(parameters)?;

    let template = asg::service_template(instance_type)?;
    template.check_signal_wiring()?;

    let client = CfnClient::new(region).await;
    let submission = submit_template(&client, stack_name, &template, &values).await?;

    println!(
        "{} stack {} ({})",
        "Created:".green().bold(),
        stack_name,
        submission.stack_id
    );
    Ok(())
}

fn parse_parameters(pairs: &[String]) -> Result<BTreeMap<String, String>, String> {
    let mut values = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("invalid parameter {pair:?}, expected KEY=VALUE"));
        };
        values.insert(key.to_string(), value.to_string());
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameters_splits_on_first_equals() {
        let values = parse_parameters(&[
            "AmiId=ami-123".to_string(),
            "KeyName=ops=primary".to_string(),
        ])
        .unwrap();
        assert_eq!(values["AmiId"], "ami-123");
        assert_eq!(values["KeyName"], "ops=primary");
    }

    #[test]
    fn test_parse_parameters_rejects_bare_keys() {
        assert!(parse_parameters(&["AmiId".to_string()]).is_err());
    }
}

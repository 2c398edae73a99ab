//! Account and session commands.

use secrecy::SecretString;
use tracing::info;

use nivasity_core::{DepartmentId, SchoolId};

use nivasity_client::RegistrationInput;

use super::build_client;

/// Arguments for account registration.
pub struct RegisterArgs {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub school: SchoolId,
    pub department: DepartmentId,
    pub admission: String,
}

/// Sign in and persist the session.
pub async fn login(email: &str, password: String) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let session = client
        .login(email, &SecretString::from(password))
        .await?;

    println!("Signed in as {} <{}>", session.user.full_name(), session.user.email);
    Ok(())
}

/// Register a new account; the backend emails a one-time code.
pub async fn register(args: RegisterArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let message = client
        .register(&RegistrationInput {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email.clone(),
            phone: args.phone,
            password: SecretString::from(args.password),
            school_id: args.school,
            department_id: args.department,
            admission_number: args.admission,
        })
        .await?;

    println!("{message}");
    println!("Run: nv-cli auth verify-otp -e {} <code>", args.email);
    Ok(())
}

/// Complete registration with the emailed code.
pub async fn verify_otp(email: &str, code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let session = client.verify_otp(email, code).await?;

    println!("Welcome, {}! Your account is ready.", session.user.full_name());
    Ok(())
}

/// Ask for a fresh one-time code.
pub async fn resend_otp(email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let message = client.resend_otp(email).await?;
    println!("{message}");
    Ok(())
}

/// Sign out and clear the stored session.
pub async fn logout() -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    client.logout().await?;
    info!("Session cleared");
    println!("Signed out.");
    Ok(())
}

/// Show the signed-in profile, fetching a fresh copy when possible.
pub async fn whoami() -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;

    if !client.is_authenticated().await {
        println!("Not signed in. Run: nv-cli auth login");
        return Ok(());
    }

    let user = client.profile().await?;
    println!("{} <{}>", user.full_name(), user.email);
    if let Some(phone) = &user.phone {
        println!("  phone:     {phone}");
    }
    if let Some(admission) = &user.admission_number {
        println!("  admission: {admission}");
    }
    if let Some(school) = user.school_id {
        println!("  school:    {school}");
    }
    if let Some(department) = user.department_id {
        println!("  dept:      {department}");
    }
    Ok(())
}

//! Materials store commands.

use nivasity_core::{DepartmentId, MaterialId, SchoolId};

use nivasity_client::MaterialQuery;

use super::build_client;

/// List materials matching the given filters.
pub async fn list(
    school: Option<SchoolId>,
    department: Option<DepartmentId>,
    search: Option<String>,
    page: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let listing = client
        .materials(&MaterialQuery {
            school,
            department,
            search,
            page,
        })
        .await?;

    if listing.items.is_empty() {
        println!("No materials found.");
        return Ok(());
    }

    for material in &listing.items {
        let course = material.course_code.as_deref().unwrap_or("-");
        println!(
            "{:>6}  {:<10} {:<40} {}",
            material.id, course, material.title, material.price
        );
    }
    println!(
        "Page {} ({} of {} total)",
        listing.page,
        listing.items.len(),
        listing.total
    );
    Ok(())
}

/// Show one material in full.
pub async fn show(id: MaterialId) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let material = client.material(id).await?;

    println!("{} ({})", material.title, material.price);
    if let Some(course) = &material.course_code {
        println!("  course: {course}");
    }
    if let Some(pages) = material.pages {
        println!("  pages:  {pages}");
    }
    if let Some(description) = &material.description {
        println!("\n{description}");
    }
    Ok(())
}

use super::Context;
use crate::cli::AddMemberArgs;
use crate::error::Result;
use serde_json::json;
use uuid::Uuid;

pub fn add_member(ctx: &Context, args: &AddMemberArgs) -> Result<()> {
    let id = ctx.with_archive_mut("add_member", |archive| {
        let id = archive.add_member(&args.name, &args.role);
        let payload = json!({"member_id": id.to_string(), "name": args.name, "role": args.role});
        Ok((id, payload))
    })?;
    println!("Added member {} ({})", args.name, id);
    Ok(())
}

pub fn list_members(ctx: &Context) -> Result<()> {
    let archive = ctx.load_archive()?;
    let members = archive.members_sorted();
    for (id, member) in &members {
        println!(
            "{}  {:<24} {:<16} joined {}",
            id,
            member.name,
            member.role,
            member.joined.format("%Y-%m-%d")
        );
    }
    println!("{} member(s)", members.len());
    Ok(())
}

pub fn remove_member(ctx: &Context, id: &Uuid) -> Result<()> {
    let member = ctx.with_archive_mut("remove_member", |archive| {
        let member = archive.remove_member(id)?;
        let payload = json!({"member_id": id.to_string(), "name": member.name});
        Ok((member, payload))
    })?;
    println!("Removed member {} ({})", member.name, id);
    Ok(())
}

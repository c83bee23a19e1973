//! Collection operation commands.

use super::{parse_fields, print_json, CliResult, Session};
use kvrec_core::{CollectionName, Request};
use serde_json::Value;

/// Prints every record of `collection`.
pub fn list(session: &Session, collection: CollectionName) -> CliResult<()> {
    run(session, &Request::list(collection))
}

/// Prints one record, or `null` if absent.
pub fn get(session: &Session, collection: CollectionName, id: &str) -> CliResult<()> {
    run(session, &Request::get(collection, id))
}

/// Creates a record from `key=value` fields and prints it.
pub fn create(session: &Session, collection: CollectionName, fields: &[String]) -> CliResult<()> {
    let fields = parse_fields(collection.schema(), fields)?;
    run(session, &Request::create(collection, fields))
}

/// Patches a record and prints the result, or `null` if absent.
pub fn update(
    session: &Session,
    collection: CollectionName,
    id: &str,
    fields: &[String],
) -> CliResult<()> {
    let patch = parse_fields(collection.schema(), fields)?;
    run(session, &Request::update(collection, id, patch))
}

/// Deletes a record and prints whether anything was removed.
pub fn delete(session: &Session, collection: CollectionName, id: &str) -> CliResult<()> {
    run(session, &Request::delete(collection, id))
}

/// Runs a named operation with JSON arguments.
pub fn query(session: &Session, operation: &str, args: &str) -> CliResult<()> {
    let args: Value = serde_json::from_str(args)?;
    let value = session.adapter().execute_named(operation, &args)?;
    print_json(&value)
}

fn run(session: &Session, request: &Request) -> CliResult<()> {
    let response = session.adapter().execute(request)?;
    print_json(&response.into_value())
}

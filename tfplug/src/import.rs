//! Import helpers for simplifying resource import implementations

use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Sets the import ID on each of the given attributes of an empty state.
///
/// Resources whose identifier doubles as a declared attribute (a parent ID
/// stored as the resource's own ID) pass both paths.
///
/// Example: ID "S0615G0KT" -> state.id = state.usergroup_id = "S0615G0KT"
pub fn import_state_passthrough_id(
    paths: &[AttributePath],
    request: &ImportResourceStateRequest,
) -> ImportResourceStateResponse {
    let mut response = ImportResourceStateResponse {
        imported_resources: vec![],
        diagnostics: vec![],
    };

    if request.id.is_empty() {
        response.diagnostics.push(Diagnostic::error(
            "Invalid import ID",
            "The import ID must not be empty",
        ));
        return response;
    }

    let mut state = DynamicValue::object();
    for path in paths {
        if let Err(e) = state.set_string(path, request.id.clone()) {
            response.diagnostics.push(
                Diagnostic::error(
                    format!("Failed to set import ID: {}", e),
                    format!("Could not set attribute '{}' to value '{}'", path, request.id),
                )
                .with_attribute(path.clone()),
            );
            return response;
        }
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
    response
}

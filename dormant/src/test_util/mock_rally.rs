//! Rally WSAPI response bodies for mock servers.

use serde_json::{json, Value};

/// A user object as returned by the WSAPI user query.
pub fn rally_user(
    object_id: u64,
    user_name: &str,
    creation_date: &str,
    last_login_date: Option<&str>,
    subscription_permission: &str,
    disabled: bool,
) -> Value {
    json!({
        "_ref": format!("https://rally1.rallydev.com/slm/webservice/v2.0/user/{}", object_id),
        "_type": "User",
        "ObjectID": object_id,
        "UserName": user_name,
        "EmailAddress": user_name,
        "CreationDate": creation_date,
        "LastLoginDate": last_login_date,
        "SubscriptionPermission": subscription_permission,
        "Disabled": disabled
    })
}

/// One page of a user query.
pub fn query_result(results: Vec<Value>, total_result_count: usize, start_index: usize) -> Value {
    json!({
        "QueryResult": {
            "Errors": [],
            "Warnings": [],
            "TotalResultCount": total_result_count,
            "StartIndex": start_index,
            "PageSize": results.len(),
            "Results": results
        }
    })
}

pub fn query_error(message: &str) -> Value {
    json!({
        "QueryResult": {
            "Errors": [message],
            "Warnings": [],
            "TotalResultCount": 0,
            "Results": []
        }
    })
}

/// Response to an update, echoing the `Disabled` field.
pub fn operation_result(object_id: u64, disabled: bool) -> Value {
    json!({
        "OperationResult": {
            "Errors": [],
            "Warnings": [],
            "Object": {
                "ObjectID": object_id,
                "Disabled": disabled
            }
        }
    })
}

pub fn operation_error(message: &str) -> Value {
    json!({
        "OperationResult": {
            "Errors": [message],
            "Warnings": []
        }
    })
}

pub fn security_token(token: &str) -> Value {
    json!({
        "OperationResult": {
            "Errors": [],
            "Warnings": [],
            "SecurityToken": token
        }
    })
}

//! Minimal HTML rendering. Just enough markup to drive the routes; no
//! templating engine.

use database::{List, ListItem};

pub fn login_page(message: Option<&str>) -> String {
    page(
        "Login",
        &format!(
            "{}<form method=\"post\" action=\"/\">\
             <label>Email <input name=\"email\"></label>\
             <label>Password <input type=\"password\" name=\"password\"></label>\
             <button type=\"submit\">Login</button>\
             </form>\
             <p><a href=\"/register\">Register</a></p>",
            inline_message(message)
        ),
    )
}

pub fn register_page(message: Option<&str>) -> String {
    page(
        "Register",
        &format!(
            "{}<form method=\"post\" action=\"/register\">\
             <label>Name <input name=\"name\"></label>\
             <label>Email <input name=\"email\"></label>\
             <label>Password <input type=\"password\" name=\"password\"></label>\
             <button type=\"submit\">Register</button>\
             </form>",
            inline_message(message)
        ),
    )
}

pub fn lists_page(user_name: &str, lists: &[List]) -> String {
    let mut body = format!("<p>{}'s lists</p><ul>", escape(user_name));
    for list in lists {
        body.push_str(&format!(
            "<li><a href=\"/list-detail/{}\">{}</a>{} \
             <a href=\"/list-delete/{}\">delete</a></li>",
            list.id,
            escape(&list.name),
            if list.done { " (done)" } else { "" },
            list.id,
        ));
    }
    body.push_str("</ul><p><a href=\"/create-new-list\">Create new list</a> <a href=\"/logout\">Logout</a></p>");

    page("Your lists", &body)
}

pub fn list_detail_page(list: &List, items: &[ListItem]) -> String {
    let mut body = format!(
        "<h2>{}{}</h2><ul>",
        escape(&list.name),
        if list.done { " (done)" } else { "" }
    );
    for item in items {
        let toggle = if item.done {
            format!("<a href=\"/list-item-incomplete/{}\">mark incomplete</a>", item.id)
        } else {
            format!("<a href=\"/list-item-complete/{}\">mark complete</a>", item.id)
        };
        body.push_str(&format!(
            "<li>{}{} {} <a href=\"/edit-list-item/{}\">edit</a> \
             <a href=\"/list-item-delete/{}\">delete</a></li>",
            escape(&item.body),
            if item.done { " (done)" } else { "" },
            toggle,
            item.id,
            item.id,
        ));
    }
    body.push_str(&format!(
        "</ul><p><a href=\"/create-new-list-item/{}\">Add item</a> <a href=\"/lists\">Back</a></p>",
        list.id
    ));

    page(&list.name, &body)
}

pub fn create_list_page() -> String {
    page(
        "Create new list",
        "<form method=\"post\" action=\"/create-new-list\">\
         <label>List Name <input name=\"name\"></label>\
         <button type=\"submit\">Create New List</button>\
         </form>",
    )
}

pub fn create_list_item_page(list_id: i64) -> String {
    page(
        "Add item",
        &format!(
            "<form method=\"post\" action=\"/create-new-list-item/{}\">\
             <label>Thing to Do <input name=\"body\"></label>\
             <button type=\"submit\">Submit</button>\
             </form>",
            list_id
        ),
    )
}

pub fn edit_list_item_page(item: &ListItem) -> String {
    page(
        "Edit item",
        &format!(
            "<form method=\"post\" action=\"/edit-list-item/{}\">\
             <label>Thing to Do <input name=\"body\" value=\"{}\"></label>\
             <button type=\"submit\">Edit</button>\
             </form>",
            item.id,
            escape(&item.body)
        ),
    )
}

pub fn not_found_page() -> String {
    page("Not found", "<p>not found</p>")
}

pub fn message_page(message: &str) -> String {
    page("Error", &format!("<p>{}</p>", escape(message)))
}

fn inline_message(message: Option<&str>) -> String {
    match message {
        Some(message) => format!("<p class=\"message\">{}</p>", escape(message)),
        None => String::new(),
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>",
        escape(title),
        escape(title),
        body
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

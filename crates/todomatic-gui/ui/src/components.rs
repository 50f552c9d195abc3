mod filter_button;
mod todo_form;
mod todo_item;

pub use filter_button::FilterButton;
pub use todo_form::TodoForm;
pub use todo_item::TodoItem;

use yew::NodeRef;

pub(crate) fn focus_node(node: &NodeRef) {
  if let Some(element) =
    node.cast::<web_sys::HtmlElement>()
    && let Err(err) = element.focus()
  {
    tracing::warn!(
      error = ?err,
      "failed moving focus"
    );
  }
}

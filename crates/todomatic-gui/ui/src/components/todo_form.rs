use web_sys::HtmlInputElement;
use yew::{
  Callback,
  Html,
  InputEvent,
  Properties,
  SubmitEvent,
  TargetCast,
  function_component,
  html,
  use_state
};

#[derive(Properties, PartialEq)]
pub struct TodoFormProps {
  pub on_add: Callback<String>
}

#[function_component(TodoForm)]
pub fn todo_form(
  props: &TodoFormProps
) -> Html {
  let draft = use_state(String::new);

  let oninput = {
    let draft = draft.clone();
    Callback::from(
      move |e: InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        draft.set(input.value());
      }
    )
  };

  let onsubmit = {
    let draft = draft.clone();
    let on_add = props.on_add.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        let name = draft.trim();
        if name.is_empty() {
          tracing::debug!(
            "ignoring empty task name"
          );
          return;
        }
        on_add.emit(name.to_string());
        draft.set(String::new());
      }
    )
  };

  html! {
      <form {onsubmit}>
          <h2 class="label-wrapper">
              <label for="new-todo-input" class="label__lg">
                  { "What needs to be done?" }
              </label>
          </h2>
          <input
              type="text"
              id="new-todo-input"
              class="input input__lg"
              name="text"
              autocomplete="off"
              value={(*draft).clone()}
              {oninput}
          />
          <button type="submit" class="btn btn__primary btn__lg">
              { "Add" }
          </button>
      </form>
  }
}

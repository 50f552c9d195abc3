use todomatic_core::Task;
use web_sys::HtmlInputElement;
use yew::{
  Callback,
  Event,
  Html,
  InputEvent,
  MouseEvent,
  Properties,
  SubmitEvent,
  TargetCast,
  function_component,
  html,
  use_effect_with,
  use_mut_ref,
  use_node_ref,
  use_state
};

use super::focus_node;

#[derive(Properties, PartialEq)]
pub struct TodoItemProps {
  pub task:      Task,
  pub on_toggle: Callback<String>,
  pub on_delete: Callback<String>,
  pub on_edit:   Callback<(String, String)>
}

#[function_component(TodoItem)]
pub fn todo_item(
  props: &TodoItemProps
) -> Html {
  let editing = use_state(|| false);
  let draft = use_state(String::new);
  let edit_field = use_node_ref();
  let edit_button = use_node_ref();
  let was_editing =
    use_mut_ref(|| None::<bool>);

  {
    let edit_field = edit_field.clone();
    let edit_button =
      edit_button.clone();
    use_effect_with(
      *editing,
      move |editing| {
        let previous = was_editing
          .borrow_mut()
          .replace(*editing);
        match (previous, *editing) {
          | (Some(false), true) => {
            focus_node(&edit_field)
          }
          | (Some(true), false) => {
            focus_node(&edit_button)
          }
          | _ => {}
        }
        || ()
      }
    );
  }

  let id = props.task.id.clone();
  let name = props.task.name.clone();

  if *editing {
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
      let editing = editing.clone();
      let on_edit = props.on_edit.clone();
      let id = id.clone();
      Callback::from(
        move |e: SubmitEvent| {
          e.prevent_default();
          let new_name = draft.trim();
          if new_name.is_empty() {
            return;
          }
          on_edit.emit((
            id.clone(),
            new_name.to_string()
          ));
          draft.set(String::new());
          editing.set(false);
        }
      )
    };

    let on_cancel = {
      let draft = draft.clone();
      let editing = editing.clone();
      Callback::from(move |_: MouseEvent| {
        draft.set(String::new());
        editing.set(false);
      })
    };

    return html! {
        <li class="todo">
            <form class="stack-small" {onsubmit}>
                <div class="form-group">
                    <label class="todo-label" for={id.clone()}>
                        { format!("New name for {name}") }
                    </label>
                    <input
                        id={id.clone()}
                        class="todo-text"
                        type="text"
                        value={(*draft).clone()}
                        ref={edit_field}
                        {oninput}
                    />
                </div>
                <div class="btn-group">
                    <button type="button" class="btn todo-cancel" onclick={on_cancel}>
                        { "Cancel" }
                        <span class="visually-hidden">{ format!("renaming {name}") }</span>
                    </button>
                    <button type="submit" class="btn btn__primary todo-edit">
                        { "Save" }
                        <span class="visually-hidden">{ format!("new name for {name}") }</span>
                    </button>
                </div>
            </form>
        </li>
    };
  }

  let on_toggle = {
    let on_toggle =
      props.on_toggle.clone();
    let id = id.clone();
    Callback::from(move |_: Event| {
      on_toggle.emit(id.clone())
    })
  };

  let on_delete = {
    let on_delete =
      props.on_delete.clone();
    let id = id.clone();
    Callback::from(move |_: MouseEvent| {
      on_delete.emit(id.clone())
    })
  };

  let on_start_edit = {
    let editing = editing.clone();
    Callback::from(move |_: MouseEvent| {
      editing.set(true)
    })
  };

  html! {
      <li class="todo">
          <div class="stack-small">
              <div class="c-cb">
                  <input
                      id={id.clone()}
                      type="checkbox"
                      checked={props.task.completed}
                      onchange={on_toggle}
                  />
                  <label class="todo-label" for={id}>
                      { name.clone() }
                  </label>
              </div>
              <div class="btn-group">
                  <button type="button" class="btn" ref={edit_button} onclick={on_start_edit}>
                      { "Edit " }
                      <span class="visually-hidden">{ name.clone() }</span>
                  </button>
                  <button type="button" class="btn btn__danger" onclick={on_delete}>
                      { "Delete " }
                      <span class="visually-hidden">{ name }</span>
                  </button>
              </div>
          </div>
      </li>
  }
}

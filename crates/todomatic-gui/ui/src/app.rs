use std::rc::Rc;

use todomatic_core::{
  Filter,
  FocusController,
  TaskAction,
  TaskStore
};
use yew::{
  Callback,
  Html,
  Reducible,
  function_component,
  html,
  use_effect_with,
  use_mut_ref,
  use_node_ref,
  use_reducer
};

use crate::components::{
  FilterButton,
  TodoForm,
  TodoItem,
  focus_node
};
use crate::storage::{
  load_tasks,
  save_tasks
};

#[derive(Debug, Clone, PartialEq)]
struct TodoState {
  store: TaskStore
}

impl Reducible for TodoState {
  type Action = TaskAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut store = self.store.clone();
    store.apply(action);
    Rc::new(Self {
      store
    })
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let state = use_reducer(|| {
    TodoState {
      store: TaskStore::new(
        load_tasks()
      )
    }
  });
  let heading_ref = use_node_ref();
  let focus =
    use_mut_ref(FocusController::new);

  {
    use_effect_with(
      state.store.tasks().clone(),
      move |tasks| {
        save_tasks(tasks);
        tracing::debug!(
          count = tasks.len(),
          "persisted tasks"
        );
        || ()
      }
    );
  }

  {
    let heading_ref =
      heading_ref.clone();
    use_effect_with(
      state.store.tasks().len(),
      move |count| {
        if focus
          .borrow_mut()
          .observe(*count)
        {
          focus_node(&heading_ref);
        }
        || ()
      }
    );
  }

  let dispatcher = state.dispatcher();
  let on_add = {
    let dispatcher = dispatcher.clone();
    Callback::from(move |name: String| {
      dispatcher.dispatch(
        TaskAction::Add {
          name
        }
      )
    })
  };
  let on_toggle = {
    let dispatcher = dispatcher.clone();
    Callback::from(move |id: String| {
      dispatcher.dispatch(
        TaskAction::Toggle {
          id
        }
      )
    })
  };
  let on_delete = {
    let dispatcher = dispatcher.clone();
    Callback::from(move |id: String| {
      dispatcher.dispatch(
        TaskAction::Delete {
          id
        }
      )
    })
  };
  let on_edit = {
    let dispatcher = dispatcher.clone();
    Callback::from(
      move |(id, name): (
        String,
        String
      )| {
        dispatcher.dispatch(
          TaskAction::Edit {
            id,
            name
          }
        )
      }
    )
  };
  let on_filter = Callback::from(
    move |filter: Filter| {
      dispatcher.dispatch(
        TaskAction::SetFilter(filter)
      )
    }
  );

  let active_filter =
    state.store.filter();
  let heading =
    state.store.heading_text();

  html! {
      <div class="todoapp stack-large">
          <h1>{ "TodoMatic" }</h1>
          <TodoForm on_add={on_add} />
          <div class="filters btn-group stack-exception">
              {
                  for Filter::ALL.iter().map(|filter| html! {
                      <FilterButton
                          key={filter.label()}
                          filter={*filter}
                          pressed={*filter == active_filter}
                          on_select={on_filter.clone()}
                      />
                  })
              }
          </div>
          <h2 id="list-heading" tabindex="-1" ref={heading_ref}>
              { heading }
          </h2>
          <ul
              role="list"
              class="todo-list stack-large stack-exception"
              aria-labelledby="list-heading"
          >
              {
                  for state.store.visible().into_iter().map(|task| html! {
                      <TodoItem
                          key={task.id.clone()}
                          task={task.clone()}
                          on_toggle={on_toggle.clone()}
                          on_delete={on_delete.clone()}
                          on_edit={on_edit.clone()}
                      />
                  })
              }
          </ul>
      </div>
  }
}

//! End-to-end scenarios over a real `UnixListener` with a temp socket
//! path, exercising the concrete scenarios enumerated for the protocol
//! and lifecycle components.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pxd::client::send_request;
use pxd::handler::Handler;
use pxd::runtime::Stopper;
use pxd::server::Server;
use pxd_core::canvas::Canvas;
use pxd_core::history::History;
use tokio::sync::Mutex;

struct RunningDaemon {
    socket_path: PathBuf,
    stop: Arc<Stopper>,
    serve_task: tokio::task::JoinHandle<()>,
    _dir: tempfile::TempDir,
}

impl RunningDaemon {
    async fn spawn(width: usize, height: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("pxd.sock");

        let history = Arc::new(Mutex::new(History::new(Canvas::new(width, height).unwrap())));
        let stop = Arc::new(Stopper::new());
        let handler_stop = stop.clone();
        let handler = Handler::new(history, move || handler_stop.stop());

        let server = Server::bind(&socket_path, handler).unwrap();
        let serve_stop = stop.clone();
        let serve_task = tokio::spawn(async move {
            server.serve(serve_stop).await.unwrap();
        });

        RunningDaemon {
            socket_path,
            stop,
            serve_task,
            _dir: dir,
        }
    }

    async fn send(&self, line: &str) -> String {
        send_request(&self.socket_path, line).await
    }

    async fn shutdown(self) {
        self.stop.stop();
        tokio::time::timeout(Duration::from_secs(1), self.serve_task)
            .await
            .expect("server should stop promptly")
            .unwrap();
    }
}

#[tokio::test]
async fn basic_draw() {
    let daemon = RunningDaemon::spawn(4, 4).await;
    assert_eq!(daemon.send("set_pixel 0 0 #ff0000").await, "ok");
    assert_eq!(daemon.send("get_pixel 0 0").await, "ok #ff0000ff");
    assert_eq!(daemon.send("get_pixel 3 3").await, "ok #00000000");
    daemon.shutdown().await;
}

#[tokio::test]
async fn rect_and_line() {
    let daemon = RunningDaemon::spawn(4, 4).await;
    assert_eq!(daemon.send("fill_rect 1 1 2 2 blue").await, "ok");
    assert_eq!(daemon.send("get_pixel 1 1").await, "ok #0000ffff");
    assert_eq!(daemon.send("line 0 3 3 3 red").await, "ok");
    assert_eq!(daemon.send("get_pixel 0 3").await, "ok #ff0000ff");
    assert_eq!(daemon.send("get_pixel 3 3").await, "ok #ff0000ff");
    daemon.shutdown().await;
}

#[tokio::test]
async fn clear_then_undo() {
    let daemon = RunningDaemon::spawn(4, 4).await;
    daemon.send("set_pixel 0 0 #ff0000").await;
    daemon.send("fill_rect 1 1 2 2 blue").await;
    assert_eq!(daemon.send("clear").await, "ok");
    assert_eq!(daemon.send("get_pixel 0 0").await, "ok #00000000");
    assert_eq!(daemon.send("undo").await, "ok");
    assert_eq!(daemon.send("get_pixel 0 0").await, "ok #ff0000ff");
    assert_eq!(daemon.send("get_pixel 1 1").await, "ok #0000ffff");
    daemon.shutdown().await;
}

#[tokio::test]
async fn bounds_error_response() {
    let daemon = RunningDaemon::spawn(4, 4).await;
    let response = daemon.send("set_pixel -1 0 red").await;
    assert_eq!(response, "err out_of_bounds pixel (-1,0) outside canvas");
    daemon.shutdown().await;
}

#[tokio::test]
async fn invalid_color_response() {
    let daemon = RunningDaemon::spawn(4, 4).await;
    let response = daemon.send("set_pixel 0 0 notacolor").await;
    assert!(response.starts_with("err invalid_color"));
    assert_eq!(daemon.send("get_pixel 0 0").await, "ok #00000000");
    daemon.shutdown().await;
}

#[tokio::test]
async fn stop_command_replies_ok_and_shuts_down_within_bound() {
    let daemon = RunningDaemon::spawn(4, 4).await;
    assert_eq!(daemon.send("stop").await, "ok");
    tokio::time::timeout(Duration::from_secs(2), daemon.serve_task)
        .await
        .expect("server should exit within the bounded time")
        .unwrap();
}

/// Drives `pxd::runtime::Runtime::run` directly, rather than
/// `Server::serve` alone, since shutdown ordering is a property of the
/// whole runtime (accept loop plus cleanup), not of the accept loop in
/// isolation. Requires a genuine multi-threaded runtime: the race this
/// guards against only exists when the accept-loop task and a spawned
/// connection task can run on different OS threads at once.
#[test]
fn stop_command_through_runtime_run_delivers_response_before_shutdown() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap();

    let response = rt.block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("pxd.sock");
        let history = Arc::new(Mutex::new(History::new(Canvas::new(4, 4).unwrap())));
        let stop = Arc::new(Stopper::new());
        let handler_stop = stop.clone();
        let handler = Handler::new(history, move || handler_stop.stop());
        let server = Server::bind(&socket_path, handler).unwrap();
        let runtime = pxd::runtime::Runtime::new(PathBuf::new(), socket_path.clone(), stop);

        let client = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            send_request(&socket_path, "stop").await
        });

        let (runtime_result, response) = tokio::join!(runtime.run(server), client);
        runtime_result.unwrap();
        response.unwrap()
    });

    // `Runtime::run` has now returned. `Server::serve` only returns once
    // every spawned connection -- including the one that wrote this
    // response -- has been joined, so tearing the whole runtime down
    // immediately (as `main` does the instant its async fn returns) cannot
    // race ahead of a write that already happened.
    rt.shutdown_timeout(Duration::from_millis(50));
    assert_eq!(response, "ok");
}

#[tokio::test]
async fn redo_invalidated_by_new_mutation_after_undo() {
    let daemon = RunningDaemon::spawn(4, 4).await;
    daemon.send("set_pixel 0 0 red").await;
    daemon.send("undo").await;
    daemon.send("set_pixel 1 0 blue").await;
    assert_eq!(daemon.send("redo").await, "err no_history nothing to redo");
    daemon.shutdown().await;
}

#[tokio::test]
async fn concurrent_clients_at_disjoint_coordinates_all_settle() {
    let daemon = Arc::new(RunningDaemon::spawn(8, 8).await);
    let mut tasks = Vec::new();
    for i in 0..8u8 {
        let socket_path = daemon.socket_path.clone();
        tasks.push(tokio::spawn(async move {
            let line = format!("set_pixel {i} 0 #00ff00");
            send_request(&socket_path, &line).await
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), "ok");
    }
    for i in 0..8u8 {
        let response = daemon.send(&format!("get_pixel {i} 0")).await;
        assert_eq!(response, "ok #00ff00ff");
    }

    let daemon = Arc::try_unwrap(daemon).ok().expect("no other references remain");
    daemon.shutdown().await;
}
